//! Schedule entities: tasks, blocks and calendar events.
//!
//! Every constructor validates its invariants, so a value of these types is
//! always fit for the scheduling pipeline. Raw JSON records live in
//! [`input`] and convert into these types.

pub mod input;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::time::SLOT_MIN;

pub use input::{BlockRecord, DayData, DayInput, EventRecord, TaskRecord};

/// Granularity of a requested task duration, in minutes.
pub const RAW_DURATION_STEP: u32 = 5;

/// Two-level scheduling priority. `A` is placed before `B`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Priority {
    #[default]
    A,
    B,
}

impl Priority {
    /// Sort rank: lower goes first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::A => 0,
            Priority::B => 1,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::A => f.write_str("A"),
            Priority::B => f.write_str("B"),
        }
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Priority::A),
            "B" => Ok(Priority::B),
            other => Err(ValidationError::InvalidPriority(other.to_string())),
        }
    }
}

/// Half-open time range `[start, end)` with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interval {
    #[serde(rename = "start_utc")]
    start: DateTime<Utc>,
    #[serde(rename = "end_utc")]
    end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ValidationError> {
        if start >= end {
            return Err(ValidationError::InvalidTimeRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Check if this interval overlaps with a time range
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && self.end > start
    }
}

/// A flexible task waiting to be placed on the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    id: String,
    title: String,
    category: String,
    duration_min: u32,
    duration_raw_min: u32,
    priority: Priority,
    earliest_start_utc: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a task from the requested duration; the scheduled duration is
    /// the requested one rounded up to the next slot multiple.
    pub fn new(
        id: impl Into<String>,
        duration_raw_min: u32,
        priority: Priority,
    ) -> Result<Self, ValidationError> {
        Self::with_durations(id, round_up_to_slot(duration_raw_min), duration_raw_min, priority)
    }

    /// Create a task with an explicit scheduled duration.
    pub fn with_durations(
        id: impl Into<String>,
        duration_min: u32,
        duration_raw_min: u32,
        priority: Priority,
    ) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::MissingField("id"));
        }
        if duration_raw_min == 0 || duration_raw_min % RAW_DURATION_STEP != 0 {
            return Err(ValidationError::InvalidDuration {
                field: "duration_raw_min",
                value: i64::from(duration_raw_min),
                message: "must be a positive multiple of 5",
            });
        }
        if duration_min == 0 || i64::from(duration_min) % SLOT_MIN != 0 {
            return Err(ValidationError::InvalidDuration {
                field: "duration_min",
                value: i64::from(duration_min),
                message: "must be a positive multiple of 10",
            });
        }
        if duration_min < duration_raw_min {
            return Err(ValidationError::InvalidDuration {
                field: "duration_min",
                value: i64::from(duration_min),
                message: "must not be shorter than duration_raw_min",
            });
        }

        Ok(Self {
            id,
            title: String::new(),
            category: String::new(),
            duration_min,
            duration_raw_min,
            priority,
            earliest_start_utc: None,
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_earliest_start(mut self, earliest_start_utc: Option<DateTime<Utc>>) -> Self {
        self.earliest_start_utc = earliest_start_utc;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Scheduled duration, a multiple of [`SLOT_MIN`].
    pub fn duration_min(&self) -> u32 {
        self.duration_min
    }

    /// Duration as originally requested.
    pub fn duration_raw_min(&self) -> u32 {
        self.duration_raw_min
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn earliest_start_utc(&self) -> Option<DateTime<Utc>> {
        self.earliest_start_utc
    }

    /// Number of contiguous slots this task occupies once placed.
    pub fn slots_needed(&self) -> usize {
        (i64::from(self.duration_min) / SLOT_MIN) as usize
    }
}

/// Round a requested duration up to the next slot multiple.
pub fn round_up_to_slot(minutes: u32) -> u32 {
    let slot = SLOT_MIN as u32;
    minutes.div_ceil(slot).saturating_mul(slot)
}

/// User-declared busy time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    id: String,
    title: Option<String>,
    #[serde(flatten)]
    interval: Interval,
}

impl Block {
    pub fn new(id: impl Into<String>, interval: Interval) -> Self {
        Self {
            id: id.into(),
            title: None,
            interval,
        }
    }

    /// Create a block with a freshly generated id.
    pub fn generated(interval: Interval) -> Self {
        Self::new(uuid::Uuid::new_v4().simple().to_string(), interval)
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn interval(&self) -> &Interval {
        &self.interval
    }
}

/// When a calendar event takes place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EventSpan {
    /// Timed event with instants on both ends.
    Timed(Interval),
    /// Date-ranged event, `end_date` exclusive.
    AllDay {
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
    },
}

/// Calendar event imported from an external calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    id: String,
    title: String,
    all_day: bool,
    #[serde(flatten)]
    span: EventSpan,
}

impl Event {
    pub fn timed(id: impl Into<String>, title: impl Into<String>, interval: Interval) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            all_day: false,
            span: EventSpan::Timed(interval),
        }
    }

    pub fn all_day(
        id: impl Into<String>,
        title: impl Into<String>,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
    ) -> Result<Self, ValidationError> {
        if let Some(end) = end_date {
            if end <= start_date {
                return Err(ValidationError::InvalidDateRange {
                    start: start_date,
                    end,
                });
            }
        }
        Ok(Self {
            id: id.into(),
            title: title.into(),
            all_day: true,
            span: EventSpan::AllDay {
                start_date,
                end_date,
            },
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_all_day(&self) -> bool {
        self.all_day
    }

    pub fn span(&self) -> &EventSpan {
        &self.span
    }

    /// Busy interval of a timed event; `None` for all-day events, which never
    /// block slots.
    pub fn busy_interval(&self) -> Option<&Interval> {
        match &self.span {
            EventSpan::Timed(interval) => Some(interval),
            EventSpan::AllDay { .. } => None,
        }
    }

    /// Whether an all-day event covers `day`: `[start_date, end_date)`, or
    /// exactly `start_date` when open-ended. Timed events answer `false`.
    pub fn covers_date(&self, day: NaiveDate) -> bool {
        match self.span {
            EventSpan::Timed(_) => false,
            EventSpan::AllDay {
                start_date,
                end_date: Some(end),
            } => start_date <= day && day < end,
            EventSpan::AllDay {
                start_date,
                end_date: None,
            } => day == start_date,
        }
    }
}

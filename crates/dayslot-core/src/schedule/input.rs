//! Raw input records.
//!
//! These mirror the JSON shapes produced by the import/CRUD layer (RFC 3339
//! strings, optional fields) and convert into validated entities.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{round_up_to_slot, Block, Event, Interval, Priority, Task};
use crate::error::ValidationError;
use crate::storage::Entity;
use crate::time::{parse_instant, parse_target_day, ReferenceZone};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub duration_min: Option<i64>,
    #[serde(default)]
    pub duration_raw_min: Option<i64>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub earliest_start_utc: Option<String>,
}

impl TaskRecord {
    /// Validate and build a [`Task`].
    ///
    /// A missing `duration_min` is derived from `duration_raw_min`; a missing
    /// priority defaults to `A`.
    pub fn into_task(self, zone: &ReferenceZone) -> Result<Task, ValidationError> {
        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .ok_or(ValidationError::MissingField("id"))?;
        let raw = self
            .duration_raw_min
            .ok_or(ValidationError::MissingField("duration_raw_min"))?;
        let raw = to_minutes("duration_raw_min", raw, "must be a positive multiple of 5")?;
        let duration = match self.duration_min {
            Some(minutes) => to_minutes("duration_min", minutes, "must be a positive multiple of 10")?,
            None => round_up_to_slot(raw),
        };
        let priority = match self.priority.as_deref() {
            Some(p) => p.parse()?,
            None => Priority::default(),
        };
        let earliest = match self.earliest_start_utc.as_deref() {
            Some(text) if !text.trim().is_empty() => Some(parse_instant(text, zone)?),
            _ => None,
        };

        Ok(Task::with_durations(id, duration, raw, priority)?
            .with_title(self.title)
            .with_category(self.category)
            .with_earliest_start(earliest))
    }
}

fn to_minutes(field: &'static str, value: i64, message: &'static str) -> Result<u32, ValidationError> {
    u32::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or(ValidationError::InvalidDuration {
            field,
            value,
            message,
        })
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub start_utc: Option<String>,
    #[serde(default)]
    pub end_utc: Option<String>,
}

impl BlockRecord {
    /// Validate and build a [`Block`], generating an id when none is given.
    pub fn into_block(self, zone: &ReferenceZone) -> Result<Block, ValidationError> {
        let start = self
            .start_utc
            .as_deref()
            .ok_or(ValidationError::MissingField("start_utc"))?;
        let end = self
            .end_utc
            .as_deref()
            .ok_or(ValidationError::MissingField("end_utc"))?;
        let interval = Interval::new(parse_instant(start, zone)?, parse_instant(end, zone)?)?;

        let block = match self.id.filter(|id| !id.trim().is_empty()) {
            Some(id) => Block::new(id, interval),
            None => Block::generated(interval),
        };
        Ok(block.with_title(self.title))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub start_utc: Option<String>,
    #[serde(default)]
    pub end_utc: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

impl EventRecord {
    /// Validate and build an [`Event`].
    ///
    /// All-day events take their dates from `start_date`/`end_date`, falling
    /// back to the date part of `start_utc`/`end_utc`.
    pub fn into_event(self, zone: &ReferenceZone) -> Result<Event, ValidationError> {
        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .ok_or(ValidationError::MissingField("id"))?;

        if self.all_day {
            let start = self
                .start_date
                .or(self.start_utc)
                .ok_or(ValidationError::MissingField("start_date"))?;
            let start = parse_target_day(&start, zone)?;
            let end = self
                .end_date
                .or(self.end_utc)
                .map(|text| parse_target_day(&text, zone))
                .transpose()?;
            return Event::all_day(id, self.title, start, end);
        }

        let start = self
            .start_utc
            .as_deref()
            .ok_or(ValidationError::MissingField("start_utc"))?;
        let end = self
            .end_utc
            .as_deref()
            .ok_or(ValidationError::MissingField("end_utc"))?;
        let interval = Interval::new(parse_instant(start, zone)?, parse_instant(end, zone)?)?;
        Ok(Event::timed(id, self.title, interval))
    }
}

/// Everything a scheduling call reads, as supplied on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DayInput {
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
    #[serde(default)]
    pub events: Vec<EventRecord>,
    #[serde(default)]
    pub blocks: Vec<BlockRecord>,
}

/// Validated entities for one scheduling call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayData {
    pub tasks: Vec<Task>,
    pub events: Vec<Event>,
    pub blocks: Vec<Block>,
}

impl DayInput {
    /// Convert every record, failing on the first invalid one.
    pub fn into_data(self, zone: &ReferenceZone) -> Result<DayData, ValidationError> {
        let tasks = convert("task", self.tasks, |r| r.into_task(zone))?;
        let events = convert("event", self.events, |r| r.into_event(zone))?;
        let blocks = convert("block", self.blocks, |r| r.into_block(zone))?;
        reject_duplicates(&tasks)?;
        reject_duplicates(&events)?;
        reject_duplicates(&blocks)?;
        Ok(DayData {
            tasks,
            events,
            blocks,
        })
    }
}

// Stores are keyed by id; a repeated id would be placed and reported twice.
fn reject_duplicates<T: Entity>(items: &[T]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    match items.iter().find(|item| !seen.insert(item.id())) {
        Some(dup) => Err(ValidationError::DuplicateId {
            kind: T::KIND,
            id: dup.id().to_string(),
        }),
        None => Ok(()),
    }
}

fn convert<R, T>(
    kind: &'static str,
    records: Vec<R>,
    f: impl Fn(R) -> Result<T, ValidationError>,
) -> Result<Vec<T>, ValidationError> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            f(record).map_err(|source| ValidationError::InRecord {
                kind,
                index,
                source: Box::new(source),
            })
        })
        .collect()
}

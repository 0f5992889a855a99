//! Single-day slot scheduler.
//!
//! This module turns a day's busy intervals and a pool of flexible tasks into
//! a 144-slot grid:
//! - Builds fixed-busy occupancy from timed events and blocks
//! - Orders tasks by priority, earliest start and duration
//! - Places each task at the earliest contiguous run of free slots
//! - Optionally compacts placed tasks leftward
//! - Renders the `{date, slots, unplaced}` report
//!
//! The pipeline is pure: same input, same report.

pub mod occupancy;
pub mod ordering;
pub mod placer;
pub mod report;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::schedule::{Block, DayData, Event, Task};
use crate::storage::Config;
use crate::time::ReferenceZone;

pub use occupancy::{build_occupancy, fixed_intervals, mark_busy, Occupancy};
pub use ordering::{clamped_earliest_start, order_tasks};
pub use placer::{compact, earliest_slot, find_slot, place, PlacedTask, Placement};
pub use report::{render, DayReport, ScheduledTask, SlotState};

/// Placement algorithm selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementStrategy {
    /// First-fit only.
    #[default]
    Greedy,
    /// First-fit followed by a leftward compaction pass.
    Compact,
}

impl PlacementStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Greedy => "greedy",
            Self::Compact => "compact",
        }
    }
}

impl fmt::Display for PlacementStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlacementStrategy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "greedy" => Ok(Self::Greedy),
            "compact" => Ok(Self::Compact),
            other => Err(ValidationError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// Inputs for one scheduling call.
#[derive(Debug, Clone)]
pub struct ScheduleRequest {
    /// Target local calendar day.
    pub day: NaiveDate,
    pub tasks: Vec<Task>,
    pub events: Vec<Event>,
    pub blocks: Vec<Block>,
    pub strategy: PlacementStrategy,
    /// Echo the strategy name in the report.
    pub echo_algo: bool,
}

impl ScheduleRequest {
    pub fn new(day: NaiveDate, data: DayData) -> Self {
        Self {
            day,
            tasks: data.tasks,
            events: data.events,
            blocks: data.blocks,
            strategy: PlacementStrategy::default(),
            echo_algo: false,
        }
    }

    pub fn with_strategy(mut self, strategy: PlacementStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_echo_algo(mut self, echo: bool) -> Self {
        self.echo_algo = echo;
        self
    }
}

/// Runs the scheduling pipeline for a reference zone.
#[derive(Debug, Clone, Default)]
pub struct DayScheduler {
    zone: ReferenceZone,
}

impl DayScheduler {
    /// Create a scheduler for the given zone
    pub fn new(zone: ReferenceZone) -> Self {
        Self { zone }
    }

    /// Create with the zone from a loaded config
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.timezone)
    }

    pub fn zone(&self) -> &ReferenceZone {
        &self.zone
    }

    /// UTC instant of local midnight for `day`.
    pub fn day_start(&self, day: NaiveDate) -> DateTime<Utc> {
        self.zone.local_midnight(day)
    }

    /// Generate the grid report for `request`.
    pub fn generate(&self, request: &ScheduleRequest) -> DayReport {
        let day_start = self.day_start(request.day);
        let fixed = build_occupancy(
            day_start,
            fixed_intervals(day_start, &request.events, &request.blocks),
        );
        let ordered = order_tasks(&request.tasks, day_start);
        let mut placement = place(&fixed, ordered, day_start);
        if request.strategy == PlacementStrategy::Compact {
            compact(&mut placement, &fixed);
        }

        let algo = request.echo_algo.then_some(request.strategy);
        let report = render(request.day, day_start, &placement, &fixed, algo);
        let all_day = request
            .events
            .iter()
            .filter(|e| e.is_all_day() && e.covers_date(request.day))
            .count();
        tracing::info!(
            day = %request.day,
            algo = %request.strategy,
            tasks = request.tasks.len(),
            all_day_events = all_day,
            placed = report.placements().len(),
            unplaced = report.unplaced.len(),
            "generated day schedule"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{Interval, Priority};

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn jan_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    #[test]
    fn strategy_parses_known_names_only() {
        assert_eq!("greedy".parse::<PlacementStrategy>().unwrap(), PlacementStrategy::Greedy);
        assert_eq!("compact".parse::<PlacementStrategy>().unwrap(), PlacementStrategy::Compact);
        assert_eq!(
            "optimal".parse::<PlacementStrategy>().unwrap_err(),
            ValidationError::UnsupportedAlgorithm("optimal".into())
        );
    }

    #[test]
    fn grid_starts_at_local_midnight() {
        // Midnight in UTC+9 is 15:00Z the day before; a block at 15:00Z-16:00Z
        // fills the first six slots.
        let scheduler = DayScheduler::new(ReferenceZone::default());
        let block = Block::new(
            "b",
            Interval::new(utc("2024-12-31T15:00:00Z"), utc("2024-12-31T16:00:00Z")).unwrap(),
        );
        let request = ScheduleRequest::new(
            jan_first(),
            DayData {
                blocks: vec![block],
                ..Default::default()
            },
        );
        let report = scheduler.generate(&request);
        assert_eq!(&report.slots[..7], &[1, 1, 1, 1, 1, 1, 0]);
    }

    #[test]
    fn dst_day_grid_still_spans_144_slots_from_midnight() {
        // 2025-03-09 is 23 hours long in New York; the grid runs one hour into
        // the next local day.
        let scheduler = DayScheduler::new(ReferenceZone::Named(chrono_tz::America::New_York));
        let day = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(scheduler.day_start(day), utc("2025-03-09T05:00:00Z"));

        let late = Block::new(
            "late",
            Interval::new(utc("2025-03-10T03:50:00Z"), utc("2025-03-10T04:00:00Z")).unwrap(),
        );
        let next_day = Block::new(
            "next",
            Interval::new(utc("2025-03-10T04:00:00Z"), utc("2025-03-10T06:00:00Z")).unwrap(),
        );
        let request = ScheduleRequest::new(
            day,
            DayData {
                blocks: vec![late, next_day],
                ..Default::default()
            },
        );
        let report = scheduler.generate(&request);
        assert_eq!(report.slots.len(), 144);
        assert_eq!(report.slots[136], 0);
        assert!(report.slots[137..].iter().all(|&code| code == 1));
        assert_eq!(report.count(SlotState::FixedBusy), 7);
    }

    #[test]
    fn skipped_midnight_starts_grid_at_first_valid_hour() {
        let scheduler = DayScheduler::new(ReferenceZone::Named(chrono_tz::America::Santiago));
        let day = NaiveDate::from_ymd_opt(2025, 9, 7).unwrap();
        let request = ScheduleRequest::new(
            day,
            DayData {
                tasks: vec![Task::new("t", 30, Priority::A).unwrap()],
                ..Default::default()
            },
        );
        let report = scheduler.generate(&request);
        assert_eq!(report.slots.len(), 144);
        let placed = &report.placements()[0];
        assert_eq!(placed.start_slot, 0);
        assert_eq!(placed.start_utc, utc("2025-09-07T04:00:00Z"));
    }

    #[test]
    fn quarter_hour_offset_can_start_before_earliest_start() {
        // Midnight at +05:45 is 18:15Z; 18:26Z rounds up to 18:30Z, which
        // lies in slot 1 (18:25Z-18:35Z).
        let zone: ReferenceZone = "+05:45".parse().unwrap();
        let scheduler = DayScheduler::new(zone);
        let earliest = utc("2024-12-31T18:26:00Z");
        let request = ScheduleRequest::new(
            jan_first(),
            DayData {
                tasks: vec![Task::new("t", 20, Priority::A)
                    .unwrap()
                    .with_earliest_start(Some(earliest))],
                ..Default::default()
            },
        );
        let report = scheduler.generate(&request);
        let placed = &report.placements()[0];
        assert_eq!(placed.start_slot, 1);
        assert_eq!(placed.start_utc, utc("2024-12-31T18:25:00Z"));
        assert!(placed.start_utc < earliest);
    }

    #[test]
    fn echo_algo_fills_the_algo_field() {
        let scheduler = DayScheduler::new(ReferenceZone::utc());
        let request = ScheduleRequest::new(jan_first(), DayData::default())
            .with_strategy(PlacementStrategy::Compact)
            .with_echo_algo(true);
        assert_eq!(scheduler.generate(&request).algo, Some(PlacementStrategy::Compact));

        let quiet = ScheduleRequest::new(jan_first(), DayData::default());
        assert_eq!(scheduler.generate(&quiet).algo, None);
    }

    #[test]
    fn compact_matches_greedy_placed_set() {
        let scheduler = DayScheduler::new(ReferenceZone::utc());
        let tasks = vec![
            Task::new("a", 30, Priority::A).unwrap(),
            Task::new("b", 45, Priority::B).unwrap(),
            Task::new("c", 120, Priority::A)
                .unwrap()
                .with_earliest_start(Some(utc("2025-01-01T09:05:00Z"))),
        ];
        let data = DayData {
            tasks,
            ..Default::default()
        };
        let greedy = scheduler.generate(&ScheduleRequest::new(jan_first(), data.clone()));
        let compact = scheduler.generate(
            &ScheduleRequest::new(jan_first(), data).with_strategy(PlacementStrategy::Compact),
        );
        assert_eq!(greedy.slots, compact.slots);
        assert_eq!(greedy.unplaced, compact.unplaced);
    }
}

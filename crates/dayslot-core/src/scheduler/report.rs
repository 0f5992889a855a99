//! Day-grid report rendering.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::occupancy::Occupancy;
use super::placer::Placement;
use super::PlacementStrategy;
use crate::time::slot_start;

/// Per-slot state as exposed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SlotState {
    Free = 0,
    FixedBusy = 1,
    Task = 2,
}

impl SlotState {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Where a placed task ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub task_id: String,
    pub start_slot: usize,
    pub slots: usize,
    /// Start of `start_slot` counted from local midnight.
    ///
    /// When the zone offset is not a multiple of ten minutes (`+05:45`), slot
    /// boundaries are offset from the epoch-aligned quantization of the
    /// task's earliest start, so this can fall up to nine minutes before it.
    pub start_utc: DateTime<Utc>,
    pub end_utc: DateTime<Utc>,
}

/// The externally consumable result of one scheduling call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayReport {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algo: Option<PlacementStrategy>,
    pub slots: Vec<u8>,
    pub unplaced: Vec<String>,
    #[serde(skip)]
    placements: Vec<ScheduledTask>,
}

impl DayReport {
    /// Placed tasks ordered by start slot.
    pub fn placements(&self) -> &[ScheduledTask] {
        &self.placements
    }

    /// Count of slots carrying `state`.
    pub fn count(&self, state: SlotState) -> usize {
        self.slots.iter().filter(|&&code| code == state.code()).count()
    }
}

/// Render the final grid.
///
/// `fixed` is the occupancy from events and blocks only; the placer never
/// assigns a task into a fixed-busy slot, so the two codes never collide.
pub fn render(
    date: NaiveDate,
    day_start: DateTime<Utc>,
    placement: &Placement,
    fixed: &Occupancy,
    algo: Option<PlacementStrategy>,
) -> DayReport {
    let slots = placement
        .grid()
        .iter()
        .zip(fixed.iter())
        .map(|(cell, &busy)| match (cell, busy) {
            (Some(_), _) => SlotState::Task,
            (None, true) => SlotState::FixedBusy,
            (None, false) => SlotState::Free,
        })
        .map(SlotState::code)
        .collect();

    let mut placements: Vec<ScheduledTask> = placement
        .placed()
        .iter()
        .map(|p| ScheduledTask {
            task_id: p.task_id.clone(),
            start_slot: p.start_slot,
            slots: p.slots,
            start_utc: slot_start(day_start, p.start_slot),
            end_utc: slot_start(day_start, p.start_slot + p.slots),
        })
        .collect();
    placements.sort_by_key(|p| p.start_slot);

    DayReport {
        date,
        algo,
        slots,
        unplaced: placement.unplaced().to_vec(),
        placements,
    }
}

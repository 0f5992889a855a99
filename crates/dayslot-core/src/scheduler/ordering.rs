//! Deterministic task ordering for the greedy pass.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};

use crate::schedule::Task;
use crate::time::{quantize, Rounding};

/// Earliest start of `task` on the grid: its constraint (or the day start)
/// rounded up to a slot boundary, never before `day_start`.
pub fn clamped_earliest_start(task: &Task, day_start: DateTime<Utc>) -> DateTime<Utc> {
    let requested = task.earliest_start_utc().unwrap_or(day_start);
    quantize(&requested, Rounding::Ceil).max(day_start)
}

/// Sort tasks for placement.
///
/// Key: priority (A first), then clamped earliest start, then longer
/// duration first. The sort is stable, so full ties keep input order.
pub fn order_tasks(tasks: &[Task], day_start: DateTime<Utc>) -> Vec<&Task> {
    let mut ordered: Vec<&Task> = tasks.iter().collect();
    ordered.sort_by_key(|task| {
        (
            task.priority().rank(),
            clamped_earliest_start(task, day_start),
            Reverse(task.duration_min()),
        )
    });
    ordered
}

//! Fixed-busy occupancy over the day grid.

use chrono::{DateTime, Duration, Utc};

use crate::schedule::{Block, Event, Interval};
use crate::time::{quantize, slot_index, Rounding, DAY_SLOTS};

/// One flag per slot; `true` means the slot is taken.
pub type Occupancy = [bool; DAY_SLOTS];

/// Mark the slots covered by `interval`, widened outward to slot boundaries.
pub fn mark_busy(occupancy: &mut Occupancy, interval: &Interval, day_start: DateTime<Utc>) {
    let s = clamp_index(slot_index(quantize(&interval.start(), Rounding::Floor), day_start));
    let e = clamp_index(slot_index(quantize(&interval.end(), Rounding::Ceil), day_start));
    if s < e {
        occupancy[s..e].fill(true);
    }
}

fn clamp_index(idx: i64) -> usize {
    idx.clamp(0, DAY_SLOTS as i64) as usize
}

/// Build the occupancy map for the day starting at `day_start`.
///
/// Intervals entirely outside the day leave no marks.
pub fn build_occupancy<'a>(
    day_start: DateTime<Utc>,
    intervals: impl IntoIterator<Item = &'a Interval>,
) -> Occupancy {
    let mut occupancy = [false; DAY_SLOTS];
    for interval in intervals {
        mark_busy(&mut occupancy, interval, day_start);
    }
    occupancy
}

/// Busy intervals that matter for the day: timed events overlapping it, and
/// every block (out-of-day blocks are clamped away later).
///
/// All-day events are dropped; they never occupy slots.
pub fn fixed_intervals<'a>(
    day_start: DateTime<Utc>,
    events: &'a [Event],
    blocks: &'a [Block],
) -> Vec<&'a Interval> {
    let day_end = day_start + Duration::days(1);
    let event_intervals = events.iter().filter_map(|event| match event.busy_interval() {
        Some(interval) if interval.overlaps(day_start, day_end) => Some(interval),
        Some(_) => None,
        None => {
            tracing::debug!(event_id = event.id(), "all-day event does not block slots");
            None
        }
    });
    event_intervals
        .chain(blocks.iter().map(Block::interval))
        .collect()
}

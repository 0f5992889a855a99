//! Greedy first-fit placement and the optional compaction pass.

use chrono::{DateTime, Utc};

use super::occupancy::Occupancy;
use super::ordering::clamped_earliest_start;
use crate::schedule::Task;
use crate::time::{slot_index, DAY_SLOTS};

/// A task that received a contiguous run of slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedTask {
    pub task_id: String,
    /// First slot of the run.
    pub start_slot: usize,
    /// Run length.
    pub slots: usize,
    /// Earliest slot the task may start at.
    pub earliest_slot: usize,
}

/// Result of a placement pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    grid: Vec<Option<String>>,
    placed: Vec<PlacedTask>,
    unplaced: Vec<String>,
}

impl Placement {
    /// Task id per slot, `None` where no task sits.
    pub fn grid(&self) -> &[Option<String>] {
        &self.grid
    }

    /// Placed tasks, in placement order.
    pub fn placed(&self) -> &[PlacedTask] {
        &self.placed
    }

    /// Ids of tasks that did not fit, in placement order.
    pub fn unplaced(&self) -> &[String] {
        &self.unplaced
    }
}

/// First slot a task may occupy, clamped to the grid start.
pub fn earliest_slot(task: &Task, day_start: DateTime<Utc>) -> usize {
    let start = clamped_earliest_start(task, day_start);
    slot_index(start, day_start).max(0) as usize
}

/// First index `>= start_idx` that begins `need` consecutive free slots.
///
/// Runs never extend past the last slot, so a task that would cross the end
/// of the day is never found.
pub fn find_slot(occupancy: &Occupancy, start_idx: usize, need: usize) -> Option<usize> {
    if need == 0 || need > DAY_SLOTS {
        return None;
    }
    let mut run = 0;
    for (idx, busy) in occupancy.iter().enumerate().skip(start_idx) {
        if *busy {
            run = 0;
            continue;
        }
        run += 1;
        if run == need {
            return Some(idx + 1 - need);
        }
    }
    None
}

/// Place `ordered` tasks one by one at the earliest feasible run.
///
/// `occupancy` holds the fixed-busy slots and is not modified; the pass works
/// on its own copy.
pub fn place<'a>(
    occupancy: &Occupancy,
    ordered: impl IntoIterator<Item = &'a Task>,
    day_start: DateTime<Utc>,
) -> Placement {
    let mut taken = *occupancy;
    let mut placement = Placement {
        grid: vec![None; DAY_SLOTS],
        placed: Vec::new(),
        unplaced: Vec::new(),
    };

    for task in ordered {
        let earliest = earliest_slot(task, day_start);
        let need = task.slots_needed();
        match find_slot(&taken, earliest, need) {
            Some(idx) => {
                taken[idx..idx + need].fill(true);
                for cell in &mut placement.grid[idx..idx + need] {
                    *cell = Some(task.id().to_string());
                }
                tracing::debug!(task_id = task.id(), start_slot = idx, slots = need, "placed task");
                placement.placed.push(PlacedTask {
                    task_id: task.id().to_string(),
                    start_slot: idx,
                    slots: need,
                    earliest_slot: earliest,
                });
            }
            None => {
                tracing::debug!(task_id = task.id(), earliest_slot = earliest, slots = need, "no room for task");
                placement.unplaced.push(task.id().to_string());
            }
        }
    }

    placement
}

/// Slide placed tasks left into free space.
///
/// Tasks are visited by start slot; each moves to the earliest free run at or
/// after its own earliest slot, if that is left of where it sits. The sets of
/// placed and unplaced tasks never change and no task moves right.
pub fn compact(placement: &mut Placement, fixed: &Occupancy) {
    let mut taken = *fixed;
    for placed in &placement.placed {
        taken[placed.start_slot..placed.start_slot + placed.slots].fill(true);
    }

    let mut order: Vec<usize> = (0..placement.placed.len()).collect();
    order.sort_by_key(|&i| placement.placed[i].start_slot);

    for i in order {
        let current = placement.placed[i].clone();
        let range = current.start_slot..current.start_slot + current.slots;
        taken[range.clone()].fill(false);

        let target = find_slot(&taken, current.earliest_slot, current.slots)
            .filter(|&idx| idx < current.start_slot)
            .unwrap_or(current.start_slot);

        taken[target..target + current.slots].fill(true);
        if target != current.start_slot {
            for cell in &mut placement.grid[range] {
                *cell = None;
            }
            for cell in &mut placement.grid[target..target + current.slots] {
                *cell = Some(current.task_id.clone());
            }
            tracing::debug!(
                task_id = %current.task_id,
                from = current.start_slot,
                to = target,
                "compacted task"
            );
            placement.placed[i].start_slot = target;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Priority;

    fn day() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn task(id: &str, minutes: u32) -> Task {
        Task::new(id, minutes, Priority::A).unwrap()
    }

    fn busy(ranges: &[std::ops::Range<usize>]) -> Occupancy {
        let mut occ = [false; DAY_SLOTS];
        for r in ranges {
            occ[r.clone()].fill(true);
        }
        occ
    }

    #[test]
    fn find_slot_is_first_fit() {
        let occ = busy(&[0..2, 4..5]);
        assert_eq!(find_slot(&occ, 0, 2), Some(2));
        assert_eq!(find_slot(&occ, 0, 3), Some(5));
        assert_eq!(find_slot(&occ, 3, 1), Some(3));
    }

    #[test]
    fn find_slot_never_crosses_the_day_end() {
        let occ = busy(&[0..140]);
        assert_eq!(find_slot(&occ, 0, 4), Some(140));
        assert_eq!(find_slot(&occ, 0, 5), None);
        assert_eq!(find_slot(&occ, 0, DAY_SLOTS + 1), None);
        assert_eq!(find_slot(&[false; DAY_SLOTS], 0, DAY_SLOTS), Some(0));
        assert_eq!(find_slot(&[false; DAY_SLOTS], 1, DAY_SLOTS), None);
    }

    #[test]
    fn places_in_order_and_records_failures() {
        let occ = busy(&[3..6]);
        let tasks = vec![task("a", 30), task("b", 30), task("huge", 1440)];
        let placement = place(&occ, &tasks, day());

        assert_eq!(placement.grid()[0].as_deref(), Some("a"));
        assert_eq!(placement.grid()[6].as_deref(), Some("b"));
        assert_eq!(placement.grid()[3], None);
        assert_eq!(placement.unplaced(), ["huge".to_string()]);
        assert_eq!(placement.placed().len(), 2);
    }

    #[test]
    fn does_not_touch_the_input_occupancy() {
        let occ = busy(&[]);
        let tasks = vec![task("a", 30)];
        let _ = place(&occ, &tasks, day());
        assert!(occ.iter().all(|b| !b));
    }

    #[test]
    fn compaction_slides_tasks_left_into_gaps() {
        let fixed = busy(&[0..2]);
        // Hand-built placement with a hole at slots 2..5.
        let mut grid = vec![None; DAY_SLOTS];
        for cell in &mut grid[5..8] {
            *cell = Some("late".to_string());
        }
        let mut placement = Placement {
            grid,
            placed: vec![PlacedTask {
                task_id: "late".into(),
                start_slot: 5,
                slots: 3,
                earliest_slot: 0,
            }],
            unplaced: vec!["nope".into()],
        };

        compact(&mut placement, &fixed);

        assert_eq!(placement.placed()[0].start_slot, 2);
        assert!(placement.grid()[2..5].iter().all(|c| c.as_deref() == Some("late")));
        assert!(placement.grid()[5..8].iter().all(Option::is_none));
        assert_eq!(placement.unplaced(), ["nope".to_string()]);
    }

    #[test]
    fn compaction_respects_earliest_slot() {
        let mut grid = vec![None; DAY_SLOTS];
        for cell in &mut grid[10..12] {
            *cell = Some("t".to_string());
        }
        let mut placement = Placement {
            grid,
            placed: vec![PlacedTask {
                task_id: "t".into(),
                start_slot: 10,
                slots: 2,
                earliest_slot: 8,
            }],
            unplaced: Vec::new(),
        };

        compact(&mut placement, &busy(&[]));
        assert_eq!(placement.placed()[0].start_slot, 8);
    }

    #[test]
    fn compaction_after_greedy_is_stable() {
        let occ = busy(&[6..9, 20..30]);
        let tasks = vec![task("a", 60), task("b", 40), task("c", 20)];
        let greedy = place(&occ, &tasks, day());
        let mut compacted = greedy.clone();
        compact(&mut compacted, &occ);
        assert_eq!(greedy, compacted);
    }
}

//! # dayslot Core Library
//!
//! Single-day task scheduling on a fixed grid of 144 ten-minute slots. Fixed
//! busy time (calendar events, user blocks) is rounded outward onto the grid,
//! then flexible tasks are placed greedily, earliest feasible slot first.
//!
//! ## Architecture
//!
//! - **Time**: slot quantization and the reference zone for naive input
//! - **Schedule**: validated Task/Block/Event entities and their JSON records
//! - **Scheduler**: occupancy, ordering, placement and report rendering
//! - **Storage**: in-memory repositories and TOML configuration
//!
//! ## Key Components
//!
//! - [`DayScheduler`]: runs the whole pipeline for one day
//! - [`DayReport`]: the `{date, slots, unplaced}` result
//! - [`Stores`]: volatile task/block/event repositories
//! - [`Config`]: application configuration management

pub mod error;
pub mod schedule;
pub mod scheduler;
pub mod storage;
pub mod time;

pub use error::{ConfigError, CoreError, ErrorKind, ValidationError};
pub use schedule::{Block, DayData, DayInput, Event, EventSpan, Interval, Priority, Task};
pub use scheduler::{DayReport, DayScheduler, PlacementStrategy, ScheduleRequest, SlotState};
pub use storage::{Config, MemoryRepository, Repository, Stores};
pub use time::{quantize, ReferenceZone, Rounding, DAY_SLOTS, SLOT_MIN};

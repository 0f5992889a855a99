//! Time handling for the day grid.
//!
//! - [`quantize`]: slot constants, floor/ceil rounding and slot indexing
//! - [`zone`]: the reference zone used to read naive input and to find the
//!   UTC instant of local midnight

pub mod quantize;
pub mod zone;

pub use quantize::{quantize, slot_index, slot_start, Rounding, DAY_SLOTS, SLOT_MIN, SLOT_SEC};
pub use zone::{format_instant, parse_instant, parse_target_day, ReferenceZone};

//! Slot quantization.
//!
//! The day is cut into [`DAY_SLOTS`] slots of [`SLOT_MIN`] minutes. All
//! rounding happens on epoch seconds, so a rounded instant lands on the same
//! boundary whatever zone it is expressed in.

use chrono::{DateTime, Duration, TimeZone, Utc};

/// Minutes per slot.
pub const SLOT_MIN: i64 = 10;
/// Seconds per slot.
pub const SLOT_SEC: i64 = SLOT_MIN * 60;
/// Slots per scheduled day (24h).
pub const DAY_SLOTS: usize = 144;

/// Rounding direction for [`quantize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Round down to the slot boundary at or before the instant.
    Floor,
    /// Round up to the slot boundary at or after the instant.
    Ceil,
}

/// Round `instant` to a slot boundary, keeping its zone.
///
/// A sub-second remainder counts as "past the boundary" for [`Rounding::Ceil`].
pub fn quantize<Tz: TimeZone>(instant: &DateTime<Tz>, rounding: Rounding) -> DateTime<Tz> {
    let secs = instant.timestamp();
    let floor = secs.div_euclid(SLOT_SEC) * SLOT_SEC;
    let on_boundary = secs == floor && instant.timestamp_subsec_nanos() == 0;
    let rounded = match rounding {
        Rounding::Floor => floor,
        Rounding::Ceil if on_boundary => floor,
        Rounding::Ceil => floor + SLOT_SEC,
    };

    // Only fails at the very edge of chrono's representable range.
    match DateTime::<Utc>::from_timestamp(rounded, 0) {
        Some(utc) => utc.with_timezone(&instant.timezone()),
        None => instant.clone(),
    }
}

/// Index of the slot containing `t`, counted from `base`.
///
/// Floors toward negative infinity, so instants before `base` yield negative
/// indices and callers clamp as needed.
pub fn slot_index(t: DateTime<Utc>, base: DateTime<Utc>) -> i64 {
    (t.timestamp() - base.timestamp()).div_euclid(SLOT_SEC)
}

/// Start instant of slot `idx` counted from `base`.
pub fn slot_start(base: DateTime<Utc>, idx: usize) -> DateTime<Utc> {
    base + Duration::minutes(idx as i64 * SLOT_MIN)
}

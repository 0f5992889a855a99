//! Reference zone and ISO-8601 parsing.
//!
//! Instants are normalized to UTC as soon as they are parsed. Naive strings
//! (no offset, no `Z`) are read in the configured [`ReferenceZone`], which
//! defaults to a fixed UTC+09:00 offset.

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    SecondsFormat, TimeZone, Utc,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
];

/// Zone used to interpret naive input and to locate local midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceZone {
    Fixed(FixedOffset),
    Named(chrono_tz::Tz),
}

impl Default for ReferenceZone {
    fn default() -> Self {
        match FixedOffset::east_opt(9 * 3600) {
            Some(jst) => Self::Fixed(jst),
            None => Self::utc(),
        }
    }
}

impl ReferenceZone {
    /// The UTC zone.
    pub fn utc() -> Self {
        Self::Fixed(Utc.fix())
    }

    /// Resolve a local wall-clock time to UTC.
    ///
    /// Ambiguous times (DST fall-back) resolve to the earlier instant; times
    /// skipped by a DST jump are rejected.
    pub fn localize(&self, naive: NaiveDateTime) -> Result<DateTime<Utc>, ValidationError> {
        let resolved = match self {
            Self::Fixed(offset) => earliest(offset.from_local_datetime(&naive)),
            Self::Named(tz) => earliest(tz.from_local_datetime(&naive)),
        };
        resolved.ok_or(ValidationError::NonexistentLocalTime(naive))
    }

    /// UTC instant of local midnight on `date`.
    ///
    /// In the few zones whose DST jump skips midnight, the first local time
    /// that exists after midnight is used.
    pub fn local_midnight(&self, date: NaiveDate) -> DateTime<Utc> {
        let midnight = date.and_time(NaiveTime::MIN);
        (0..=2)
            .find_map(|hours| self.localize(midnight + Duration::hours(hours)).ok())
            .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
    }

    /// Local calendar date of `instant`.
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        match self {
            Self::Fixed(offset) => instant.with_timezone(offset).date_naive(),
            Self::Named(tz) => instant.with_timezone(tz).date_naive(),
        }
    }
}

fn earliest<T: TimeZone>(result: LocalResult<DateTime<T>>) -> Option<DateTime<Utc>> {
    result.earliest().map(|dt| dt.with_timezone(&Utc))
}

impl fmt::Display for ReferenceZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(offset) if offset.local_minus_utc() == 0 => f.write_str("UTC"),
            Self::Fixed(offset) => write!(f, "{offset}"),
            Self::Named(tz) => f.write_str(tz.name()),
        }
    }
}

impl FromStr for ReferenceZone {
    type Err = ValidationError;

    /// Accepts `UTC`/`Z`, `+HH:MM`/`+HHMM` offsets and IANA names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("utc") || s == "Z" {
            return Ok(Self::utc());
        }
        if s.starts_with('+') || s.starts_with('-') {
            return parse_offset(s)
                .map(Self::Fixed)
                .ok_or_else(|| ValidationError::InvalidTimezone(s.to_string()));
        }
        s.parse::<chrono_tz::Tz>()
            .map(Self::Named)
            .map_err(|_| ValidationError::InvalidTimezone(s.to_string()))
    }
}

fn parse_offset(s: &str) -> Option<FixedOffset> {
    let (sign, rest) = s.split_at(1);
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    let secs = hours * 3600 + minutes * 60;
    match sign {
        "+" => FixedOffset::east_opt(secs),
        _ => FixedOffset::west_opt(secs),
    }
}

impl Serialize for ReferenceZone {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ReferenceZone {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Parse an ISO-8601 instant and normalize it to UTC.
///
/// A trailing `Z` means UTC, an explicit offset is honoured, and naive values
/// (including a bare `YYYY-MM-DD`, read as local midnight) are interpreted in
/// `zone`.
pub fn parse_instant(text: &str, zone: &ReferenceZone) -> Result<DateTime<Utc>, ValidationError> {
    let raw = text.trim();
    let invalid = |message: &str| ValidationError::InvalidInstant {
        value: text.to_string(),
        message: message.to_string(),
    };
    if raw.is_empty() {
        return Err(invalid("empty value"));
    }

    let normalized = match raw.strip_suffix('Z').or_else(|| raw.strip_suffix('z')) {
        Some(stripped) => format!("{stripped}+00:00"),
        None => raw.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, format) {
            return zone.localize(naive);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(&normalized, "%Y-%m-%d") {
        return zone.localize(date.and_time(NaiveTime::MIN));
    }
    Err(invalid("not an ISO-8601 datetime"))
}

/// Parse the target day of a scheduling request.
///
/// `YYYY-MM-DD` is taken as the local date directly; anything containing a
/// `T` is parsed as an instant and converted to the local date in `zone`.
pub fn parse_target_day(text: &str, zone: &ReferenceZone) -> Result<NaiveDate, ValidationError> {
    let raw = text.trim();
    if raw.contains('T') {
        let instant =
            parse_instant(raw, zone).map_err(|_| ValidationError::InvalidDate(text.to_string()))?;
        return Ok(zone.date_of(instant));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(text.to_string()))
}

/// RFC 3339 with seconds precision and a `Z` suffix.
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn local_midnight_on_spring_forward_day() {
        // The New York jump happens at 02:00, so midnight is still EST.
        let zone = ReferenceZone::Named(chrono_tz::America::New_York);
        let day = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(zone.local_midnight(day), utc("2025-03-09T05:00:00Z"));
        let next = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        assert_eq!(zone.local_midnight(next), utc("2025-03-10T04:00:00Z"));
    }

    #[test]
    fn local_midnight_skipped_by_dst_uses_next_hour() {
        // Santiago jumps from 00:00 -04 straight to 01:00 -03.
        let zone = ReferenceZone::Named(chrono_tz::America::Santiago);
        let day = NaiveDate::from_ymd_opt(2025, 9, 7).unwrap();
        assert!(zone.localize(day.and_time(NaiveTime::MIN)).is_err());
        assert_eq!(zone.local_midnight(day), utc("2025-09-07T04:00:00Z"));

        let before = NaiveDate::from_ymd_opt(2025, 9, 6).unwrap();
        assert_eq!(zone.local_midnight(before), utc("2025-09-06T04:00:00Z"));
    }

    #[test]
    fn default_zone_is_plus_nine() {
        let zone = ReferenceZone::default();
        assert_eq!(zone.to_string(), "+09:00");
    }

    #[test]
    fn parses_zone_spellings() {
        assert_eq!("UTC".parse::<ReferenceZone>().unwrap(), ReferenceZone::utc());
        assert_eq!("+0900".parse::<ReferenceZone>().unwrap(), ReferenceZone::default());
        assert_eq!(
            "-05:30".parse::<ReferenceZone>().unwrap().to_string(),
            "-05:30"
        );
        assert_eq!(
            "Asia/Tokyo".parse::<ReferenceZone>().unwrap(),
            ReferenceZone::Named(chrono_tz::Asia::Tokyo)
        );
        assert!("Mars/Olympus".parse::<ReferenceZone>().is_err());
        assert!("+9".parse::<ReferenceZone>().is_err());
    }

    #[test]
    fn z_suffix_and_offsets_normalize_to_utc() {
        let zone = ReferenceZone::default();
        assert_eq!(
            parse_instant("2025-01-01T12:00:00Z", &zone).unwrap(),
            utc("2025-01-01T12:00:00Z")
        );
        assert_eq!(
            parse_instant("2025-01-01T21:00:00+09:00", &zone).unwrap(),
            utc("2025-01-01T12:00:00Z")
        );
        assert_eq!(
            parse_instant("2025-01-01T12:00+00:00", &zone).unwrap(),
            utc("2025-01-01T12:00:00Z")
        );
    }

    #[test]
    fn naive_values_use_reference_zone() {
        let zone = ReferenceZone::default();
        assert_eq!(
            parse_instant("2025-01-01T09:00:00", &zone).unwrap(),
            utc("2025-01-01T00:00:00Z")
        );
        assert_eq!(
            parse_instant("2025-01-01T09:00", &ReferenceZone::utc()).unwrap(),
            utc("2025-01-01T09:00:00Z")
        );
        assert_eq!(
            parse_instant("2025-01-01", &zone).unwrap(),
            utc("2024-12-31T15:00:00Z")
        );
    }

    #[test]
    fn rejects_garbage() {
        let zone = ReferenceZone::default();
        assert!(matches!(
            parse_instant("not-a-date", &zone),
            Err(ValidationError::InvalidInstant { .. })
        ));
        assert!(parse_instant("  ", &zone).is_err());
    }

    #[test]
    fn dst_gap_is_rejected() {
        let zone: ReferenceZone = "America/New_York".parse().unwrap();
        assert!(matches!(
            parse_instant("2025-03-09T02:30:00", &zone),
            Err(ValidationError::NonexistentLocalTime(_))
        ));
    }

    #[test]
    fn target_day_from_date_or_datetime() {
        let zone = ReferenceZone::default();
        assert_eq!(
            parse_target_day("2025-01-01", &zone).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
        );
        // 20:00Z on the 1st is already the 2nd in UTC+9.
        assert_eq!(
            parse_target_day("2025-01-01T20:00:00Z", &zone).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()
        );
        assert_eq!(
            parse_target_day("2025-01-01T20:00:00", &zone).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
        );
        assert!(matches!(
            parse_target_day("01/02/2025", &zone),
            Err(ValidationError::InvalidDate(_))
        ));
    }

    #[test]
    fn local_midnight_in_fixed_and_named_zones() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(
            ReferenceZone::default().local_midnight(day),
            utc("2024-12-31T15:00:00Z")
        );
        assert_eq!(ReferenceZone::utc().local_midnight(day), utc("2025-01-01T00:00:00Z"));
        let tokyo: ReferenceZone = "Asia/Tokyo".parse().unwrap();
        assert_eq!(tokyo.local_midnight(day), utc("2024-12-31T15:00:00Z"));
    }

    #[test]
    fn formats_with_z_suffix() {
        assert_eq!(
            format_instant(&utc("2025-01-01T12:00:00.700Z")),
            "2025-01-01T12:00:00Z"
        );
    }

    #[test]
    fn zone_serde_uses_string_form() {
        let json = serde_json::to_string(&ReferenceZone::default()).unwrap();
        assert_eq!(json, "\"+09:00\"");
        let back: ReferenceZone = serde_json::from_str("\"Asia/Tokyo\"").unwrap();
        assert_eq!(back, ReferenceZone::Named(chrono_tz::Asia::Tokyo));
    }
}

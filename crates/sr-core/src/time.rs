//! Event timestamps and temporal decay.
//!
//! Signals lose weight with age following an exponential half-life:
//!
//!   factor = 2^(-days_since_event / half_life_days)
//!
//! An event with no usable timestamp is treated as happening "now" and keeps
//! its full weight.  Events stamped in the future are clamped to "now" as
//! well, so a clock skew in the source data can never amplify a signal.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const SECS_PER_DAY: f64 = 86_400.0;

/// Naive layouts accepted after RFC 3339 fails; read as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse an event timestamp.
///
/// Accepts RFC 3339 (`2024-05-01T18:30:00+06:00`), naive date-times
/// (`2024-05-01 18:30:00`, `2024-05-01T18:30:00`, `2024-05-01 18:30`) and
/// bare dates (`2024-05-01`, midnight UTC).  Returns `None` for anything
/// else, including empty strings.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Fractional days elapsed from `event` to `now`, never negative.
#[inline]
pub fn days_since(event: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let secs = (now - event).num_milliseconds() as f64 / 1_000.0;
    (secs / SECS_PER_DAY).max(0.0)
}

/// Half-life decay factor in `(0, 1]` for an event at `event` observed at
/// `now`.  `None` (unknown time) yields 1.0.
pub fn half_life_factor(event: Option<DateTime<Utc>>, now: DateTime<Utc>, half_life_days: f64) -> f64 {
    match event {
        None => 1.0,
        Some(_) if half_life_days <= 0.0 => 1.0,
        Some(t) => 2f64.powf(-days_since(t, now) / half_life_days),
    }
}

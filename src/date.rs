//! Date boundary resolution for `--since`
//!
//! Turns a free-form expression into a UTC instant. Accepted forms:
//!
//! - RFC 3339 / RFC 2822 timestamps (any offset, normalized to UTC)
//! - Naive dates and datetimes such as `2024-01-01`, `2024/01/01`,
//!   `2024-01-01 08:30:00`, `March 5, 2024` (read as UTC)
//! - `now`, `today`, `yesterday`
//! - Relative phrases: `3 days ago`, `2 weeks ago`, `90 minutes ago`

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeDelta, Utc};
use regex::Regex;
use std::sync::LazyLock;

/// Regex for relative expressions: `<count> <unit>[s] ago`
static RELATIVE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+)\s*(seconds?|secs?|minutes?|mins?|hours?|hrs?|days?|weeks?)\s+ago$")
        .expect("relative date regex is valid")
});

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%z", "%Y-%m-%dT%H:%M:%S%z"];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y%m%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Resolve `text` relative to the current time
pub fn resolve(text: &str) -> Result<DateTime<Utc>> {
    resolve_at(text, Utc::now())
}

/// Resolve `text`, using `now` for relative expressions
pub fn resolve_at(text: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::date_parse(text));
    }

    match trimmed.to_ascii_lowercase().as_str() {
        "now" => return Ok(now),
        "today" => return start_of_day(now.date_naive()).ok_or_else(|| Error::date_parse(text)),
        "yesterday" => {
            return now
                .date_naive()
                .pred_opt()
                .and_then(start_of_day)
                .ok_or_else(|| Error::date_parse(text))
        }
        _ => {}
    }

    if let Some(captures) = RELATIVE_REGEX.captures(trimmed) {
        return relative(&captures[1], &captures[2], now).ok_or_else(|| Error::date_parse(text));
    }

    parse_absolute(trimmed).ok_or_else(|| Error::date_parse(text))
}

/// Render an instant as the `since` query value, e.g. `2024-01-01T00:00:00+00:00`
pub fn to_since_param(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, false)
}

fn parse_absolute(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt.and_utc());
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(start_of_day)
}

fn start_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|ndt| ndt.and_utc())
}

fn relative(count: &str, unit: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let count: i64 = count.parse().ok()?;
    let unit = unit.to_ascii_lowercase();
    let seconds_per_unit = match unit.trim_end_matches('s') {
        "second" | "sec" => 1,
        "minute" | "min" => 60,
        "hour" | "hr" => 3_600,
        "day" => 86_400,
        "week" => 604_800,
        _ => return None,
    };
    let delta = TimeDelta::try_seconds(count.checked_mul(seconds_per_unit)?)?;
    now.checked_sub_signed(delta)
}

//! Time expression parser
//!
//! Two forms are accepted, tried in order:
//! - relative: `<n><unit>` such as `30min`, `2 hours`, `1week`
//! - absolute: a date, a time, or both, in local time
//!
//! Fields an absolute form leaves out are taken from "now": a bare time
//! lands on today, a bare date keeps the current time of day.

use chrono::{
    DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

use crate::event::model::whole_seconds;

static RELATIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s*([A-Za-z]+)$").expect("relative time regex"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognized time expression: {input:?}")]
pub struct ParseFailure {
    pub input: String,
}

enum Pattern {
    DateTime(&'static str),
    Date(&'static str),
    Time(&'static str),
}

/// Absolute forms, most specific first
const PATTERNS: &[Pattern] = &[
    Pattern::DateTime("%Y-%m-%d %H:%M:%S"),
    Pattern::DateTime("%Y-%m-%d %H:%M"),
    Pattern::DateTime("%Y/%m/%d %H:%M:%S"),
    Pattern::DateTime("%Y/%m/%d %H:%M"),
    Pattern::DateTime("%d-%m-%Y %H:%M:%S"),
    Pattern::DateTime("%d-%m-%Y %H:%M"),
    Pattern::DateTime("%d/%m/%Y %H:%M:%S"),
    Pattern::DateTime("%d/%m/%Y %H:%M"),
    Pattern::Date("%Y-%m-%d"),
    Pattern::Date("%Y/%m/%d"),
    Pattern::Date("%d-%m-%Y"),
    Pattern::Date("%d/%m/%Y"),
    Pattern::Time("%H:%M:%S"),
    Pattern::Time("%H:%M"),
];

/// Parse `text` relative to the current local time
pub fn parse(text: &str) -> Result<DateTime<Utc>, ParseFailure> {
    parse_at(text, Local::now())
}

/// Parse `text` relative to `now`
pub fn parse_at(text: &str, now: DateTime<Local>) -> Result<DateTime<Utc>, ParseFailure> {
    let trimmed = text.trim();
    parse_relative(trimmed, now)
        .or_else(|| parse_absolute(trimmed, now))
        .map(|at| whole_seconds(at.with_timezone(&Utc)))
        .ok_or_else(|| ParseFailure {
            input: text.to_string(),
        })
}

/// Seconds in one relative unit
fn unit_seconds(unit: &str) -> Option<i64> {
    match unit.to_ascii_lowercase().as_str() {
        "min" | "mins" => Some(60),
        "hour" | "hours" => Some(60 * 60),
        "day" | "days" => Some(24 * 60 * 60),
        "week" | "weeks" => Some(7 * 24 * 60 * 60),
        _ => None,
    }
}

fn parse_relative(text: &str, now: DateTime<Local>) -> Option<DateTime<Local>> {
    let caps = RELATIVE_RE.captures(text)?;
    let amount: i64 = caps[1].parse().ok()?;
    let seconds = amount.checked_mul(unit_seconds(&caps[2])?)?;
    now.checked_add_signed(Duration::try_seconds(seconds)?)
}

fn parse_absolute(text: &str, now: DateTime<Local>) -> Option<DateTime<Local>> {
    PATTERNS.iter().find_map(|pattern| {
        let naive = match pattern {
            Pattern::DateTime(fmt) => NaiveDateTime::parse_from_str(text, fmt).ok()?,
            Pattern::Date(fmt) => NaiveDate::parse_from_str(text, fmt)
                .ok()?
                .and_time(now.time()),
            Pattern::Time(fmt) => now
                .date_naive()
                .and_time(NaiveTime::parse_from_str(text, fmt).ok()?),
        };
        resolve_local(naive)
    })
}

/// Map a wall-clock time to an instant. A repeated hour resolves to its
/// first instance; a skipped hour moves forward by one hour.
fn resolve_local(naive: NaiveDateTime) -> Option<DateTime<Local>> {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(at) => Some(at),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => Local
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest(),
    }
}

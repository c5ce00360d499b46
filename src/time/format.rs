//! Local-time rendering of timestamps

use chrono::{DateTime, Local, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// `YYYY-MM-DD HH:MM:SS`
    Full,
    /// `HH:MM`
    HourMinute,
}

impl DateFormat {
    pub fn pattern(&self) -> &'static str {
        match self {
            Self::Full => "%Y-%m-%d %H:%M:%S",
            Self::HourMinute => "%H:%M",
        }
    }
}

pub fn format_timestamp(at: DateTime<Utc>, format: DateFormat) -> String {
    at.with_timezone(&Local).format(format.pattern()).to_string()
}

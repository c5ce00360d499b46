use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Cannot open event store {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot write event store {}: {source}", path.display())]
    Unwritable {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Why a single store line was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordDefect {
    #[error("expected 7 tab-separated fields, found {0}")]
    FieldCount(usize),

    #[error("field `{field}` is not a number: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("unknown priority code {0}")]
    UnknownPriority(u8),

    #[error("unknown recurrence code {0}")]
    UnknownRecurrence(u8),

    #[error("recurring record has interval 0")]
    ZeroInterval,

    #[error("timestamp {0} is out of range")]
    TimestampOutOfRange(i64),
}

/// A store line that was skipped during load
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {defect}")]
pub struct MalformedRecord {
    /// 1-based line number in the store file
    pub line: usize,
    pub defect: RecordDefect,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("Recurrence interval must be at least 1")]
    ZeroInterval,

    #[error("Recurrence ends ({until}) before the event starts ({start})")]
    EndBeforeStart {
        start: DateTime<Utc>,
        until: DateTime<Utc>,
    },

    #[error("Recurrence end {until} is more than {max_days} days after the start")]
    SpanTooLong { until: DateTime<Utc>, max_days: i64 },
}

pub type Result<T> = std::result::Result<T, StoreError>;

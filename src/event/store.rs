//! Event store - tab-separated file persistence
//!
//! One record per line, fields in fixed order:
//! `start  name  description  priority  recurrence  interval  recurrence_end`.
//! Timestamps are unix seconds. Non-recurring records carry `0` in the last
//! three columns.

use chrono::{DateTime, Utc};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::error::{MalformedRecord, RecordDefect, Result, StoreError};
use super::model::{
    EventDefinition, EventDescription, EventName, Frequency, Priority, Recurrence,
};

const FIELD_COUNT: usize = 7;

/// Result of reading the whole store
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Parsed definitions in file order
    pub definitions: Vec<EventDefinition>,

    /// Lines that were skipped
    pub skipped: Vec<MalformedRecord>,
}

pub struct EventStore {
    path: PathBuf,
}

impl EventStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolved store path, handed to the external editor
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every definition. A store that does not exist yet is empty.
    pub fn load(&self) -> Result<Vec<EventDefinition>> {
        Ok(self.load_report()?.definitions)
    }

    pub fn load_report(&self) -> Result<LoadReport> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Event store {} does not exist yet", self.path.display());
                return Ok(LoadReport::default());
            }
            Err(source) => {
                return Err(StoreError::Unreadable {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let content = String::from_utf8_lossy(&bytes);
        let report = parse_records(&content);
        for skipped in &report.skipped {
            warn!(
                "Skipping malformed record in {}: {}",
                self.path.display(),
                skipped
            );
        }
        debug!(
            "Loaded {} events from {} ({} skipped)",
            report.definitions.len(),
            self.path.display(),
            report.skipped.len()
        );
        Ok(report)
    }

    /// Append one record, creating the store if absent
    pub fn append(&self, definition: &EventDefinition) -> Result<()> {
        let unwritable = |source: std::io::Error| StoreError::Unwritable {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(unwritable)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(unwritable)?;

        // Single write so a concurrent reader sees at most one partial line
        file.write_all(format_record(definition).as_bytes())
            .map_err(unwritable)?;
        Ok(())
    }

    /// Definitions whose name or description contains `term`, ignoring case
    pub fn search(&self, term: &str) -> Result<Vec<EventDefinition>> {
        let needle = term.to_lowercase();
        Ok(self
            .load()?
            .into_iter()
            .filter(|def| matches_term(def, &needle))
            .collect())
    }
}

fn matches_term(definition: &EventDefinition, lowercase_term: &str) -> bool {
    definition
        .name
        .as_str()
        .to_lowercase()
        .contains(lowercase_term)
        || definition
            .description
            .as_str()
            .to_lowercase()
            .contains(lowercase_term)
}

/// Serialize a definition as one newline-terminated record
pub fn format_record(definition: &EventDefinition) -> String {
    let (recurrence, interval, until) = match definition.recurrence {
        Recurrence::Once => (0, 0, 0),
        Recurrence::Repeating {
            frequency,
            interval,
            until,
        } => (frequency.code(), interval.get(), until.timestamp()),
    };

    format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
        definition.start.timestamp(),
        definition.name,
        definition.description,
        definition.priority.code(),
        recurrence,
        interval,
        until
    )
}

/// Parse one record. The line may still carry its `\n` or `\r\n`.
pub fn parse_record(line: &str) -> std::result::Result<EventDefinition, RecordDefect> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let line = line.strip_suffix('\r').unwrap_or(line);

    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != FIELD_COUNT {
        return Err(RecordDefect::FieldCount(fields.len()));
    }

    let start = timestamp(number(fields[0], "start")?)?;
    let name = EventName::new(fields[1]);
    let description = EventDescription::new(fields[2]);

    let priority_code: u8 = number(fields[3], "priority")?;
    let priority =
        Priority::from_code(priority_code).ok_or(RecordDefect::UnknownPriority(priority_code))?;

    let recurrence_code: u8 = number(fields[4], "recurrence")?;
    let interval: u32 = number(fields[5], "interval")?;
    let until: i64 = number(fields[6], "recurrence_end")?;

    let recurrence = if recurrence_code == 0 {
        Recurrence::Once
    } else {
        let frequency = Frequency::from_code(recurrence_code)
            .ok_or(RecordDefect::UnknownRecurrence(recurrence_code))?;
        Recurrence::Repeating {
            frequency,
            interval: NonZeroU32::new(interval).ok_or(RecordDefect::ZeroInterval)?,
            until: timestamp(until)?,
        }
    };

    Ok(EventDefinition {
        start,
        name,
        description,
        priority,
        recurrence,
    })
}

/// Parse a whole store, skipping blank and malformed lines
pub fn parse_records(content: &str) -> LoadReport {
    let mut report = LoadReport::default();

    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_record(line) {
            Ok(definition) => report.definitions.push(definition),
            Err(defect) => report.skipped.push(MalformedRecord {
                line: index + 1,
                defect,
            }),
        }
    }

    report
}

fn number<T: std::str::FromStr>(
    value: &str,
    field: &'static str,
) -> std::result::Result<T, RecordDefect> {
    value
        .trim()
        .parse()
        .map_err(|_| RecordDefect::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

fn timestamp(secs: i64) -> std::result::Result<DateTime<Utc>, RecordDefect> {
    DateTime::from_timestamp(secs, 0).ok_or(RecordDefect::TimestampOutOfRange(secs))
}

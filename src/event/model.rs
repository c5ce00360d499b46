//! Event data model

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::num::NonZeroU32;

use super::error::DefinitionError;

pub const NAME_MAX_CHARS: usize = 49;
pub const DESCRIPTION_MAX_CHARS: usize = 99;

/// Longest recurrence accepted for a new event, about a century
pub const MAX_RECURRENCE_SPAN_DAYS: i64 = 36_525;

/// Text truncated to at most `MAX` characters on ingestion.
///
/// Tabs and line breaks are replaced with spaces so the value can never
/// split a store record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct BoundedText<const MAX: usize>(String);

impl<const MAX: usize> BoundedText<MAX> {
    pub fn new(value: impl AsRef<str>) -> Self {
        let text = value
            .as_ref()
            .chars()
            .map(|c| match c {
                '\t' | '\n' | '\r' => ' ',
                other => other,
            })
            .take(MAX)
            .collect();
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<const MAX: usize> From<String> for BoundedText<MAX> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<const MAX: usize> From<BoundedText<MAX>> for String {
    fn from(value: BoundedText<MAX>) -> Self {
        value.0
    }
}

impl<const MAX: usize> fmt::Display for BoundedText<MAX> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub type EventName = BoundedText<NAME_MAX_CHARS>;
pub type EventDescription = BoundedText<DESCRIPTION_MAX_CHARS>;

/// Event priority
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Parse priority from text
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" | "l" | "0" => Some(Self::Low),
            "medium" | "med" | "m" | "1" => Some(Self::Medium),
            "high" | "h" | "2" => Some(Self::High),
            _ => None,
        }
    }

    /// Code stored in the record's priority column
    pub fn code(&self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Low),
            1 => Some(Self::Medium),
            2 => Some(Self::High),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unit a repeating event advances by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    /// Fixed 30-day step
    Monthly,
    /// Fixed 365-day step
    Yearly,
}

impl Frequency {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" | "d" => Some(Self::Daily),
            "weekly" | "week" | "w" => Some(Self::Weekly),
            "monthly" | "month" | "m" => Some(Self::Monthly),
            "yearly" | "year" | "y" => Some(Self::Yearly),
            _ => None,
        }
    }

    /// Code stored in the record's recurrence column (0 means no recurrence)
    pub fn code(&self) -> u8 {
        match self {
            Self::Daily => 1,
            Self::Weekly => 2,
            Self::Monthly => 3,
            Self::Yearly => 4,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Daily),
            2 => Some(Self::Weekly),
            3 => Some(Self::Monthly),
            4 => Some(Self::Yearly),
            _ => None,
        }
    }

    /// Length of one unit in days
    pub fn step_days(&self) -> i64 {
        match self {
            Self::Daily => 1,
            Self::Weekly => 7,
            Self::Monthly => 30,
            Self::Yearly => 365,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether and how an event repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Recurrence {
    #[default]
    Once,
    Repeating {
        frequency: Frequency,
        /// Number of frequency units between occurrences
        interval: NonZeroU32,
        /// Inclusive upper bound for generated occurrences
        until: DateTime<Utc>,
    },
}

impl Recurrence {
    pub fn is_repeating(&self) -> bool {
        matches!(self, Self::Repeating { .. })
    }
}

/// A stored, possibly recurring event
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventDefinition {
    /// First occurrence, whole seconds
    pub start: DateTime<Utc>,

    pub name: EventName,

    #[serde(default)]
    pub description: EventDescription,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub recurrence: Recurrence,
}

impl EventDefinition {
    /// Create a one-off event with medium priority
    pub fn new(start: DateTime<Utc>, name: impl AsRef<str>, description: impl AsRef<str>) -> Self {
        Self {
            start: whole_seconds(start),
            name: EventName::new(name),
            description: EventDescription::new(description),
            priority: Priority::default(),
            recurrence: Recurrence::Once,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Make the event repeat every `interval` units of `frequency` up to `until`
    pub fn repeating(
        mut self,
        frequency: Frequency,
        interval: u32,
        until: DateTime<Utc>,
    ) -> Result<Self, DefinitionError> {
        let interval = NonZeroU32::new(interval).ok_or(DefinitionError::ZeroInterval)?;
        let until = whole_seconds(until);
        if until < self.start {
            return Err(DefinitionError::EndBeforeStart {
                start: self.start,
                until,
            });
        }
        if (until - self.start).num_days() > MAX_RECURRENCE_SPAN_DAYS {
            return Err(DefinitionError::SpanTooLong {
                until,
                max_days: MAX_RECURRENCE_SPAN_DAYS,
            });
        }
        self.recurrence = Recurrence::Repeating {
            frequency,
            interval,
            until,
        };
        Ok(self)
    }

    /// Hash of every field; stable for the lifetime of the process
    pub fn identity(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

/// One concrete instance of a definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence<'a> {
    pub definition: &'a EventDefinition,
    pub at: DateTime<Utc>,
}

impl<'a> Occurrence<'a> {
    pub fn new(definition: &'a EventDefinition, at: DateTime<Utc>) -> Self {
        Self { definition, at }
    }

    pub fn key(&self) -> OccurrenceKey {
        OccurrenceKey {
            definition: self.definition.identity(),
            at: self.at.timestamp(),
        }
    }
}

/// Identity of an occurrence that survives store reloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OccurrenceKey {
    pub definition: u64,
    pub at: i64,
}

pub(crate) fn whole_seconds(at: DateTime<Utc>) -> DateTime<Utc> {
    at.with_nanosecond(0).unwrap_or(at)
}

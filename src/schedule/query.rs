//! Ordering and filtering of occurrences for display

use chrono::{DateTime, Duration, Local, Utc};

use crate::event::{Occurrence, MAX_RECURRENCE_SPAN_DAYS};

/// Horizon of the upcoming-events view
pub const DEFAULT_UPCOMING_DAYS: u32 = 28;

/// Which occurrences a listing shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Occurrences on today's local date
    Today,
    /// Occurrences in `(now, now + days]`
    Upcoming { days: u32 },
    /// Everything the expander produced
    All,
}

impl Default for View {
    fn default() -> Self {
        Self::Upcoming {
            days: DEFAULT_UPCOMING_DAYS,
        }
    }
}

impl View {
    /// Latest instant this view can show, used to bound expansion
    pub fn horizon(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            // A local day lasts at most 25 hours
            Self::Today => days_after(now, 2),
            Self::Upcoming { days } => days_after(now, *days),
            // Repeating events cannot be scheduled further out than this
            Self::All => days_after(now, MAX_RECURRENCE_SPAN_DAYS as u32),
        }
    }
}

/// `now + days`, or the end of representable time when that overflows
fn days_after(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    Duration::try_days(i64::from(days))
        .and_then(|span| now.checked_add_signed(span))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// Ascending start time
    #[default]
    Start,
    /// Descending priority, input order among equals
    Priority,
}

pub fn sort_by_start(occurrences: &mut [Occurrence<'_>]) {
    occurrences.sort_by_key(|o| o.at);
}

pub fn sort_by_priority(occurrences: &mut [Occurrence<'_>]) {
    occurrences.sort_by(|a, b| b.definition.priority.cmp(&a.definition.priority));
}

/// Occurrences whose local calendar date equals that of `now`
pub fn due_today<'a>(occurrences: &[Occurrence<'a>], now: DateTime<Utc>) -> Vec<Occurrence<'a>> {
    let today = now.with_timezone(&Local).date_naive();
    occurrences
        .iter()
        .filter(|o| o.at.with_timezone(&Local).date_naive() == today)
        .copied()
        .collect()
}

/// Occurrences in `(now, now + days]`
pub fn upcoming<'a>(
    occurrences: &[Occurrence<'a>],
    now: DateTime<Utc>,
    days: u32,
) -> Vec<Occurrence<'a>> {
    let horizon = days_after(now, days);
    occurrences
        .iter()
        .filter(|o| o.at > now && o.at <= horizon)
        .copied()
        .collect()
}

/// Filter by `view`, then sort by `order`
pub fn select<'a>(
    occurrences: &[Occurrence<'a>],
    view: View,
    order: Order,
    now: DateTime<Utc>,
) -> Vec<Occurrence<'a>> {
    let mut selected = match view {
        View::Today => due_today(occurrences, now),
        View::Upcoming { days } => upcoming(occurrences, now, days),
        View::All => occurrences.to_vec(),
    };

    // Priority ties keep chronological order
    sort_by_start(&mut selected);
    if order == Order::Priority {
        sort_by_priority(&mut selected);
    }
    selected
}

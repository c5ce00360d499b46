//! Scheduling: recurrence expansion and occurrence queries
//!
//! - Expand stored definitions into concrete occurrences
//! - Filter to today / the next N days
//! - Order by start time or priority

pub mod query;
pub mod recurrence;

pub use query::{Order, View, DEFAULT_UPCOMING_DAYS};
pub use recurrence::expand;

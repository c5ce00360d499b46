//! CLI command implementations

pub mod definition;
pub mod edit;
pub mod list;
pub mod run;
pub mod sched;
pub mod search;

pub use definition::{Cli, Commands};

use crate::config::Config;
use crate::event::EventStore;

pub fn open_store(config: &Config) -> EventStore {
    EventStore::new(config.resolved_store_path())
}

/// Shorten `s` to at most `max` characters, marking the cut with `...`
pub fn truncate(s: &str, max: usize) -> String {
    let len = s.chars().count();
    if len <= max {
        s.to_string()
    } else if max <= 3 {
        s.chars().take(max).collect()
    } else {
        let kept: String = s.chars().take(max - 3).collect();
        format!("{}...", kept)
    }
}

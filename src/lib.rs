//! ssm - Simple Scheduler Manager
//!
//! Stores events in a tab-separated file, expands recurring ones, and runs a
//! daemon that raises a desktop notification shortly before each occurrence.

pub mod cli;
pub mod config;
pub mod event;
pub mod logging;
pub mod notifier;
pub mod schedule;
pub mod time;
pub mod watch;

//! Store watching and the notification daemon

pub mod daemon;
pub mod signal;

pub use daemon::{
    Clock, Daemon, PassReport, SystemClock, DEFAULT_LEAD_TIME_SECS, DEFAULT_POLL_INTERVAL,
};
pub use signal::{ChangeSignal, FileChangeSignal, ShutdownHandle, Signal, WatchError};

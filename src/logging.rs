//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

/// Filter directives are read from this variable
pub const LOG_ENV: &str = "SSM_LOG";

const DEFAULT_FILTER: &str = "ssm=info";

/// Install the stderr subscriber. Calling it again is a no-op.
pub fn init() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

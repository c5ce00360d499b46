//! `ssm run` command implementation

use anyhow::{Context, Result};
use clap::Args;

use crate::config::Config;
use crate::notifier::{CommandNotifier, Notifier};
use crate::watch::{Daemon, FileChangeSignal, SystemClock};

#[derive(Args)]
pub struct RunArgs {
    /// Seconds before an event at which to notify (overrides config)
    #[arg(short, long)]
    lead: Option<u64>,

    /// Maximum seconds between store reloads (overrides config)
    #[arg(long)]
    poll: Option<u64>,
}

impl RunArgs {
    fn apply(&self, mut config: Config) -> Config {
        if let Some(lead) = self.lead {
            config.lead_time_secs = lead;
        }
        if let Some(poll) = self.poll {
            config.poll_interval_secs = poll;
        }
        config
    }
}

pub async fn run(args: RunArgs) -> Result<()> {
    let config = args.apply(Config::load()?);
    let store = super::open_store(&config);

    let mut signal = FileChangeSignal::watch(store.path())
        .with_context(|| format!("Cannot watch {}", store.path().display()))?;
    let shutdown = signal.shutdown_handle();

    let notifier = CommandNotifier::from_config(&config.notifier);
    tracing::info!(
        "Notifying via '{}' {}s ahead of events",
        notifier.program(),
        config.lead_time_secs
    );

    let mut daemon = build_daemon(&config, notifier);
    let worker = tokio::task::spawn_blocking(move || daemon.run(&mut signal, &SystemClock));
    tokio::pin!(worker);

    tokio::select! {
        result = &mut worker => {
            result.context("Daemon thread panicked")?;
            return Ok(());
        }
        result = shutdown_signal() => {
            result?;
            tracing::info!("Shutdown requested");
            shutdown.shutdown();
        }
    }

    worker.await.context("Daemon thread panicked")?;
    Ok(())
}

fn build_daemon<N: Notifier>(config: &Config, notifier: N) -> Daemon<N> {
    Daemon::new(super::open_store(config), notifier)
        .with_lead_time(config.lead_time())
        .with_poll_interval(config.poll_interval())
}

/// Resolves on Ctrl+C, or SIGTERM on unix
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}

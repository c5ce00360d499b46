//! Command-line argument definitions

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use super::edit::EditArgs;
use super::list::ListArgs;
use super::run::RunArgs;
use super::sched::SchedArgs;
use super::search::SearchArgs;

/// Simple Scheduler Manager - schedule events and get notified before they start
#[derive(Parser)]
#[command(name = "ssm", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Schedule an event
    Sched(SchedArgs),

    /// Edit the event store with $EDITOR
    Edit(EditArgs),

    /// List events
    List(ListArgs),

    /// Search events by name or description
    Search(SearchArgs),

    /// Run the notifier daemon
    Run(RunArgs),

    /// Print the event store path
    Path,

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

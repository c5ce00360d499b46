//! ssm - Simple Scheduler Manager

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use ssm::cli::{self, Cli, Commands};
use ssm::logging;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Completion { shell }) => {
            generate(shell, &mut Cli::command(), "ssm", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Sched(args)) => cli::sched::run(args).await,
        Some(Commands::Edit(args)) => cli::edit::run(args).await,
        Some(Commands::List(args)) => cli::list::run(args).await,
        Some(Commands::Search(args)) => cli::search::run(args).await,
        Some(Commands::Run(args)) => cli::run::run(args).await,
        Some(Commands::Path) => cli::edit::print_path(),
        None => cli::list::overview().await,
    }
}

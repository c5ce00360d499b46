//! `ssm search` command implementation

use anyhow::Result;
use chrono::Utc;
use clap::Args;

use crate::config::Config;
use crate::schedule::{query, recurrence, View};

#[derive(Args)]
pub struct SearchArgs {
    /// Text to look for in names and descriptions (case-insensitive)
    term: String,

    /// Look N days ahead instead of the configured upcoming window
    #[arg(long)]
    days: Option<u32>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

impl SearchArgs {
    fn view(&self, config: &Config) -> View {
        View::Upcoming {
            days: self.days.unwrap_or(config.upcoming_days),
        }
    }
}

pub async fn run(args: SearchArgs) -> Result<()> {
    let config = Config::load()?;
    let store = super::open_store(&config);
    let definitions = store.search(&args.term)?;

    let now = Utc::now();
    let horizon = args.view(&config).horizon(now);
    let mut occurrences = recurrence::expand_until(&definitions, now, horizon);
    query::sort_by_start(&mut occurrences);

    if args.json {
        return super::list::print_json(&occurrences);
    }

    if occurrences.is_empty() {
        println!("No events matching '{}'.", args.term);
        return Ok(());
    }

    super::list::print_table(&occurrences);
    println!("\n{} matching events", occurrences.len());

    Ok(())
}

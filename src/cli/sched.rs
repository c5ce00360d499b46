//! `ssm sched` command implementation

use anyhow::{Context, Result};
use clap::Args;

use crate::config::Config;
use crate::event::{EventDefinition, Frequency, Priority};
use crate::time::{self, format_timestamp, DateFormat};

#[derive(Args)]
pub struct SchedArgs {
    /// When: relative (30min, 2hours, 1week) or absolute (2026-10-18 09:00, 09:00)
    when: String,

    /// Event name
    name: String,

    /// Event description
    #[arg(default_value = "")]
    description: String,

    /// Priority (low, medium, high)
    #[arg(short, long, default_value = "medium")]
    priority: String,

    /// Repeat (daily, weekly, monthly, yearly)
    #[arg(short, long, requires = "until")]
    repeat: Option<String>,

    /// Number of units between repetitions
    #[arg(short, long, default_value_t = 1)]
    every: u32,

    /// Last possible repetition, same formats as <WHEN>
    #[arg(short, long, requires = "repeat")]
    until: Option<String>,
}

pub async fn run(args: SchedArgs) -> Result<()> {
    let config = Config::load()?;
    let definition = build_definition(&args)?;

    let store = super::open_store(&config);
    store.append(&definition)?;

    println!(
        "Added \"{}\" with description \"{}\" at \"{}\"",
        definition.name,
        definition.description,
        format_timestamp(definition.start, DateFormat::Full)
    );
    if let crate::event::Recurrence::Repeating {
        frequency,
        interval,
        until,
    } = definition.recurrence
    {
        println!(
            "  Repeats {} (every {}) until {}",
            frequency,
            interval,
            format_timestamp(until, DateFormat::Full)
        );
    }

    Ok(())
}

fn build_definition(args: &SchedArgs) -> Result<EventDefinition> {
    let start = time::parse(&args.when)?;
    let priority = Priority::parse(&args.priority)
        .with_context(|| format!("Invalid priority: {}", args.priority))?;

    let definition =
        EventDefinition::new(start, &args.name, &args.description).with_priority(priority);

    match (&args.repeat, &args.until) {
        (Some(repeat), Some(until)) => {
            let frequency = Frequency::parse(repeat)
                .with_context(|| format!("Invalid repeat frequency: {}", repeat))?;
            let until = time::parse(until)?;
            Ok(definition.repeating(frequency, args.every, until)?)
        }
        _ => Ok(definition),
    }
}

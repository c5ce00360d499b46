//! `ssm list` command implementation

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;

use crate::config::Config;
use crate::event::{Occurrence, Priority, Recurrence};
use crate::schedule::{query, recurrence, Order, View};
use crate::time::{format_timestamp, DateFormat};

const TABLE_COL_WHEN: usize = 19;
const TABLE_COL_PRIORITY: usize = 8;
const TABLE_COL_NAME: usize = 24;
const TABLE_COL_DESCRIPTION: usize = 40;

#[derive(Args)]
pub struct ListArgs {
    /// Only events on today's date
    #[arg(long, conflicts_with_all = ["days", "all"])]
    today: bool,

    /// Events in the next N days
    #[arg(long, conflicts_with = "all")]
    days: Option<u32>,

    /// Every event, past ones included
    #[arg(long)]
    all: bool,

    /// Sort by priority (highest first) instead of start time
    #[arg(long)]
    by_priority: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

impl ListArgs {
    fn view(&self, config: &Config) -> View {
        if self.today {
            View::Today
        } else if self.all {
            View::All
        } else {
            View::Upcoming {
                days: self.days.unwrap_or(config.upcoming_days),
            }
        }
    }

    fn order(&self) -> Order {
        if self.by_priority {
            Order::Priority
        } else {
            Order::Start
        }
    }
}

#[derive(Serialize)]
pub(crate) struct OccurrenceJson<'a> {
    at: DateTime<Utc>,
    name: &'a str,
    description: &'a str,
    priority: Priority,
    recurrence: Recurrence,
}

impl<'a> From<&Occurrence<'a>> for OccurrenceJson<'a> {
    fn from(occurrence: &Occurrence<'a>) -> Self {
        let definition = occurrence.definition;
        Self {
            at: occurrence.at,
            name: definition.name.as_str(),
            description: definition.description.as_str(),
            priority: definition.priority,
            recurrence: definition.recurrence,
        }
    }
}

pub(crate) fn print_json(occurrences: &[Occurrence<'_>]) -> Result<()> {
    let rows: Vec<OccurrenceJson<'_>> = occurrences.iter().map(OccurrenceJson::from).collect();
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

fn print_table_header() {
    println!(
        "{:<width_when$} {:<width_priority$} {:<width_name$} {:<width_description$} REPEAT",
        "WHEN",
        "PRIORITY",
        "NAME",
        "DESCRIPTION",
        width_when = TABLE_COL_WHEN,
        width_priority = TABLE_COL_PRIORITY,
        width_name = TABLE_COL_NAME,
        width_description = TABLE_COL_DESCRIPTION
    );
    println!(
        "{}",
        "-".repeat(
            TABLE_COL_WHEN + TABLE_COL_PRIORITY + TABLE_COL_NAME + TABLE_COL_DESCRIPTION + 12
        )
    );
}

fn print_table_row(occurrence: &Occurrence<'_>) {
    let definition = occurrence.definition;
    let repeat = match definition.recurrence {
        Recurrence::Once => "-".to_string(),
        Recurrence::Repeating {
            frequency,
            interval,
            ..
        } if interval.get() == 1 => frequency.to_string(),
        Recurrence::Repeating {
            frequency,
            interval,
            ..
        } => format!("{}/{}", frequency, interval),
    };
    println!(
        "{:<width_when$} {:<width_priority$} {:<width_name$} {:<width_description$} {}",
        format_timestamp(occurrence.at, DateFormat::Full),
        definition.priority.label(),
        super::truncate(definition.name.as_str(), TABLE_COL_NAME),
        super::truncate(definition.description.as_str(), TABLE_COL_DESCRIPTION),
        repeat,
        width_when = TABLE_COL_WHEN,
        width_priority = TABLE_COL_PRIORITY,
        width_name = TABLE_COL_NAME,
        width_description = TABLE_COL_DESCRIPTION
    );
}

pub(crate) fn print_table(occurrences: &[Occurrence<'_>]) {
    print_table_header();
    for occurrence in occurrences {
        print_table_row(occurrence);
    }
}

pub async fn run(args: ListArgs) -> Result<()> {
    let config = Config::load()?;
    let store = super::open_store(&config);
    let definitions = store.load()?;

    let now = Utc::now();
    let view = args.view(&config);
    let occurrences = recurrence::expand_until(&definitions, now, view.horizon(now));
    let selected = query::select(&occurrences, view, args.order(), now);

    if args.json {
        return print_json(&selected);
    }

    if selected.is_empty() {
        println!("No events found.");
        return Ok(());
    }

    print_table(&selected);
    println!("\nTotal: {} events", selected.len());

    Ok(())
}

/// Shown when `ssm` is run without a command
pub async fn overview() -> Result<()> {
    let config = Config::load()?;
    let store = super::open_store(&config);
    let definitions = store.load()?;

    let now = Utc::now();
    let view = View::Upcoming {
        days: config.upcoming_days,
    };
    let occurrences = recurrence::expand_until(&definitions, now, view.horizon(now));
    let selected = query::select(&occurrences, view, Order::Start, now);

    println!("Current date: {}", format_timestamp(now, DateFormat::Full));
    println!("Upcoming events:");
    if selected.is_empty() {
        println!("  (none in the next {} days)", config.upcoming_days);
        return Ok(());
    }
    print_table(&selected);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventDefinition, Frequency};
    use chrono::TimeZone;

    fn args() -> ListArgs {
        ListArgs {
            today: false,
            days: None,
            all: false,
            by_priority: false,
            json: false,
        }
    }

    #[test]
    fn test_view_selection() {
        let config = Config::default();
        assert_eq!(args().view(&config), View::Upcoming { days: 28 });

        let mut a = args();
        a.days = Some(3);
        assert_eq!(a.view(&config), View::Upcoming { days: 3 });

        let mut a = args();
        a.today = true;
        assert_eq!(a.view(&config), View::Today);

        let mut a = args();
        a.all = true;
        a.by_priority = true;
        assert_eq!(a.view(&config), View::All);
        assert_eq!(a.order(), Order::Priority);
    }

    #[test]
    fn test_json_row_shape() {
        let start = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let def = EventDefinition::new(start, "Gym", "legs")
            .repeating(Frequency::Weekly, 1, start)
            .unwrap();
        let occurrence = Occurrence::new(&def, start);
        let value = serde_json::to_value(OccurrenceJson::from(&occurrence)).unwrap();
        assert_eq!(value["name"], "Gym");
        assert_eq!(value["priority"], "medium");
        assert_eq!(value["recurrence"]["kind"], "repeating");
        assert_eq!(value["recurrence"]["frequency"], "weekly");
    }
}

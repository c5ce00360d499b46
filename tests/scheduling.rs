//! Integration tests for the store -> expand -> query pipeline

use chrono::{Duration, Local, TimeZone, Utc};
use ssm::event::{EventDefinition, EventStore, Frequency, Priority, Recurrence};
use ssm::schedule::{query, recurrence, Order, View};
use ssm::time::parse_at;

const DAY: i64 = 24 * 60 * 60;

fn temp_store() -> (tempfile::TempDir, EventStore) {
    let temp = tempfile::TempDir::new().unwrap();
    let store = EventStore::new(temp.path().join("share").join("ssm.tsv"));
    (temp, store)
}

#[test]
fn test_scheduled_events_list_in_order() {
    let (_temp, store) = temp_store();
    let now = Local.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).earliest().unwrap();

    let standup = parse_at("30min", now).unwrap();
    let review = parse_at("2026-10-20 14:00", now).unwrap();
    let gym_start = parse_at("2026-10-19 18:00", now).unwrap();
    let gym_until = parse_at("2026-12-01 00:00", now).unwrap();

    store
        .append(&EventDefinition::new(review, "Review", "quarterly").with_priority(Priority::High))
        .unwrap();
    store
        .append(&EventDefinition::new(standup, "Standup", ""))
        .unwrap();
    store
        .append(
            &EventDefinition::new(gym_start, "Gym", "legs")
                .with_priority(Priority::Low)
                .repeating(Frequency::Weekly, 1, gym_until)
                .unwrap(),
        )
        .unwrap();

    let definitions = store.load().unwrap();
    assert_eq!(definitions.len(), 3);

    let now = now.with_timezone(&Utc);
    let occurrences = recurrence::expand(&definitions, now);
    // review + standup + 7 weekly gym sessions, the last on 2026-11-30
    assert_eq!(occurrences.len(), 9);

    let by_start = query::select(&occurrences, View::Upcoming { days: 7 }, Order::Start, now);
    let names: Vec<&str> = by_start
        .iter()
        .map(|o| o.definition.name.as_str())
        .collect();
    assert_eq!(names, vec!["Standup", "Gym", "Review"]);

    let by_priority = query::select(&occurrences, View::Upcoming { days: 7 }, Order::Priority, now);
    let names: Vec<&str> = by_priority
        .iter()
        .map(|o| o.definition.name.as_str())
        .collect();
    assert_eq!(names, vec!["Review", "Standup", "Gym"]);

    let today = query::select(&occurrences, View::Today, Order::Start, now);
    assert_eq!(today.len(), 1);
    assert_eq!(today[0].at, now + Duration::minutes(30));
}

#[test]
fn test_hand_edited_store_is_tolerated() {
    let (temp, store) = temp_store();
    std::fs::create_dir_all(temp.path().join("share")).unwrap();

    let t = 1_900_000_000_i64;
    let content = format!(
        "{t}\tGood\tfirst\t2\t0\t0\t0\n\
         \n\
         not-a-number\tBad\t\t1\t0\t0\t0\n\
         {t}\tShort\t1\n\
         {t}\tRepeats\t\t0\t1\t3\t{end}\n\
         {t}\tBackwards\t\t1\t1\t1\t{before}\n\
         {t}\tPartial\t\t1",
        end = t + 9 * DAY,
        before = t - DAY,
    );
    std::fs::write(store.path(), content).unwrap();

    let report = store.load_report().unwrap();
    let names: Vec<&str> = report
        .definitions
        .iter()
        .map(|d| d.name.as_str())
        .collect();
    assert_eq!(names, vec!["Good", "Repeats", "Backwards"]);
    let skipped_lines: Vec<usize> = report.skipped.iter().map(|s| s.line).collect();
    assert_eq!(skipped_lines, vec![3, 4, 7]);

    let now = Utc.timestamp_opt(t, 0).unwrap();
    let occurrences = recurrence::expand(&report.definitions, now);
    let times: Vec<(String, i64)> = occurrences
        .iter()
        .map(|o| (o.definition.name.to_string(), o.at.timestamp() - t))
        .collect();
    assert_eq!(
        times,
        vec![
            ("Good".to_string(), 0),
            ("Repeats".to_string(), 0),
            ("Repeats".to_string(), 3 * DAY),
            ("Repeats".to_string(), 6 * DAY),
            ("Repeats".to_string(), 9 * DAY),
        ]
    );
}

#[test]
fn test_long_text_is_truncated_on_store_and_load() {
    let (_temp, store) = temp_store();
    let start = Utc.timestamp_opt(1_900_000_000, 0).unwrap();
    let name = "n".repeat(80);
    let description = "tab\there ".repeat(20);

    store
        .append(&EventDefinition::new(start, &name, &description))
        .unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].name.as_str().chars().count(), 49);
    assert_eq!(loaded[0].description.as_str().chars().count(), 99);
    assert!(!loaded[0].description.as_str().contains('\t'));
    assert_eq!(loaded[0].recurrence, Recurrence::Once);
}

#[test]
fn test_search_matches_name_and_description() {
    let (_temp, store) = temp_store();
    let start = Utc.timestamp_opt(1_900_000_000, 0).unwrap();
    store
        .append(&EventDefinition::new(start, "Dentist", "checkup"))
        .unwrap();
    store
        .append(&EventDefinition::new(start, "Lunch", "with the DENTAL team"))
        .unwrap();
    store
        .append(&EventDefinition::new(start, "Gym", ""))
        .unwrap();

    assert_eq!(store.search("dent").unwrap().len(), 2);
    assert_eq!(store.search("CHECK").unwrap().len(), 1);
    assert!(store.search("swim").unwrap().is_empty());

    let found = store.search("gym").unwrap();
    let horizon = View::Upcoming { days: 1 }.horizon(start);
    assert_eq!(recurrence::expand_until(&found, start, horizon).len(), 1);
}

//! Recurrence expansion
//!
//! Turns stored definitions into the concrete occurrences the scheduler
//! acts on. One-off events always yield their start, even when past.
//! Repeating events step from `start` by a fixed number of seconds and
//! only keep candidates at or after `now` and no later than `until`, or
//! than the caller's horizon when one is given.

use chrono::{DateTime, Utc};

use crate::event::{EventDefinition, Frequency, Occurrence, Recurrence};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Fixed step between two occurrences, in seconds
pub fn step_seconds(frequency: Frequency, interval: u32) -> i64 {
    frequency.step_days() * i64::from(interval) * SECONDS_PER_DAY
}

/// Expand every definition, keeping definition order and ascending time
/// within a definition.
pub fn expand(definitions: &[EventDefinition], now: DateTime<Utc>) -> Vec<Occurrence<'_>> {
    expand_until(definitions, now, DateTime::<Utc>::MAX_UTC)
}

/// Like [`expand`], but repeating definitions stop at `horizon`
pub fn expand_until(
    definitions: &[EventDefinition],
    now: DateTime<Utc>,
    horizon: DateTime<Utc>,
) -> Vec<Occurrence<'_>> {
    let mut occurrences = Vec::with_capacity(definitions.len());
    for definition in definitions {
        expand_into(definition, now, horizon, &mut occurrences);
    }
    occurrences
}

fn expand_into<'a>(
    definition: &'a EventDefinition,
    now: DateTime<Utc>,
    horizon: DateTime<Utc>,
    out: &mut Vec<Occurrence<'a>>,
) {
    let (frequency, interval, until) = match definition.recurrence {
        Recurrence::Once => {
            out.push(Occurrence::new(definition, definition.start));
            return;
        }
        Recurrence::Repeating {
            frequency,
            interval,
            until,
        } => (frequency, interval, until),
    };

    let step = step_seconds(frequency, interval.get());
    let start = definition.start.timestamp();
    if until < definition.start {
        return;
    }
    let end = until.min(horizon).timestamp();

    // Jump straight to the first step at or after now
    let now = now.timestamp();
    let skipped_steps = if now > start {
        (now - start + step - 1) / step
    } else {
        0
    };
    let Some(mut candidate) = skipped_steps
        .checked_mul(step)
        .and_then(|offset| start.checked_add(offset))
    else {
        return;
    };

    while candidate <= end {
        if let Some(at) = DateTime::from_timestamp(candidate, 0) {
            out.push(Occurrence::new(definition, at));
        }
        candidate = match candidate.checked_add(step) {
            Some(next) => next,
            None => break,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn expand_one(definition: &EventDefinition, now: DateTime<Utc>) -> Vec<Occurrence<'_>> {
        expand(std::slice::from_ref(definition), now)
    }

    const T: i64 = 1_700_000_000;
    const DAY: i64 = SECONDS_PER_DAY;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn repeating(frequency: Frequency, interval: u32, end: i64) -> EventDefinition {
        EventDefinition::new(at(T), "recurring", "")
            .repeating(frequency, interval, at(end))
            .unwrap()
    }

    fn times(occurrences: &[Occurrence<'_>]) -> Vec<i64> {
        occurrences.iter().map(|o| o.at.timestamp()).collect()
    }

    #[test]
    fn test_one_off_yields_start_even_when_past() {
        let def = EventDefinition::new(at(T), "once", "");
        let occurrences = expand_one(&def, at(T + 10 * DAY));
        assert_eq!(times(&occurrences), vec![T]);
    }

    #[test]
    fn test_every_other_day_for_ten_days() {
        let def = repeating(Frequency::Daily, 2, T + 10 * DAY);
        let occurrences = expand_one(&def, at(T));
        assert_eq!(
            times(&occurrences),
            vec![T, T + 2 * DAY, T + 4 * DAY, T + 6 * DAY, T + 8 * DAY, T + 10 * DAY]
        );
    }

    #[test]
    fn test_past_occurrences_are_dropped() {
        let def = repeating(Frequency::Daily, 1, T + 5 * DAY);
        // Midway through day 2: days 0..=2 are past
        let occurrences = expand_one(&def, at(T + 2 * DAY + 1));
        assert_eq!(times(&occurrences), vec![T + 3 * DAY, T + 4 * DAY, T + 5 * DAY]);
    }

    #[test]
    fn test_occurrence_exactly_now_is_kept() {
        let def = repeating(Frequency::Weekly, 1, T + 21 * DAY);
        let occurrences = expand_one(&def, at(T + 7 * DAY));
        assert_eq!(times(&occurrences), vec![T + 7 * DAY, T + 14 * DAY, T + 21 * DAY]);
    }

    #[test]
    fn test_fixed_length_months_and_years() {
        let monthly = repeating(Frequency::Monthly, 1, T + 90 * DAY);
        assert_eq!(
            times(&expand_one(&monthly, at(T))),
            vec![T, T + 30 * DAY, T + 60 * DAY, T + 90 * DAY]
        );

        let yearly = repeating(Frequency::Yearly, 2, T + 1_000 * DAY);
        assert_eq!(times(&expand_one(&yearly, at(T))), vec![T, T + 730 * DAY]);
    }

    #[test]
    fn test_now_after_end_yields_nothing() {
        let def = repeating(Frequency::Daily, 1, T + 3 * DAY);
        assert!(expand_one(&def, at(T + 3 * DAY + 1)).is_empty());
    }

    #[test]
    fn test_end_before_start_yields_nothing() {
        // Only reachable through a hand-edited store
        let mut def = EventDefinition::new(at(T), "broken", "");
        def.recurrence = Recurrence::Repeating {
            frequency: Frequency::Daily,
            interval: std::num::NonZeroU32::new(1).unwrap(),
            until: at(T - DAY),
        };
        assert!(expand_one(&def, at(0)).is_empty());
    }

    #[test]
    fn test_occurrences_are_aligned_bounded_and_increasing() {
        let def = repeating(Frequency::Daily, 3, T + 100 * DAY);
        let step = step_seconds(Frequency::Daily, 3);
        for now in [T - DAY, T, T + 1, T + 50 * DAY + 17, T + 99 * DAY] {
            let ts = times(&expand_one(&def, at(now)));
            assert!(!ts.is_empty());
            for t in &ts {
                assert!(*t >= T && *t <= T + 100 * DAY);
                assert!(*t >= now);
                assert_eq!((t - T) % step, 0);
            }
            assert!(ts.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_expand_keeps_definition_order() {
        let defs = vec![
            EventDefinition::new(at(T + DAY), "later", ""),
            repeating(Frequency::Daily, 1, T + DAY),
            EventDefinition::new(at(T - DAY), "earlier", ""),
        ];
        let occurrences = expand(&defs, at(T));
        let names: Vec<&str> = occurrences
            .iter()
            .map(|o| o.definition.name.as_str())
            .collect();
        assert_eq!(names, vec!["later", "recurring", "recurring", "earlier"]);
    }

    #[test]
    fn test_horizon_bounds_distant_until() {
        // Daily until roughly the year 200000, as a hand-edited store may hold
        let mut def = EventDefinition::new(at(T), "forever", "");
        def.recurrence = Recurrence::Repeating {
            frequency: Frequency::Daily,
            interval: std::num::NonZeroU32::new(1).unwrap(),
            until: at(6_250_000_000_000),
        };
        let defs = vec![def];
        let occurrences = expand_until(&defs, at(T), at(T + 10 * DAY));
        assert_eq!(occurrences.len(), 11);
        assert_eq!(occurrences[10].at, at(T + 10 * DAY));

        // A horizon before now leaves nothing
        assert!(expand_until(&defs, at(T + DAY), at(T)).is_empty());
    }

    #[test]
    fn test_horizon_keeps_one_off_events() {
        let defs = vec![EventDefinition::new(at(T + 100 * DAY), "later", "")];
        assert_eq!(expand_until(&defs, at(T), at(T + DAY)).len(), 1);
    }

    #[test]
    fn test_huge_interval_does_not_overflow() {
        let def = repeating(Frequency::Yearly, u32::MAX, T + 10 * DAY);
        let occurrences = expand_one(&def, at(T + DAY));
        assert!(occurrences.is_empty());
    }
}

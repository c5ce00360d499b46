//! Watch/notify loop
//!
//! Each reconciling pass reloads the store, expands recurrences, and fires a
//! notification for every occurrence that has entered the lead-time window
//! and has not been notified before. The notified set is keyed by
//! [`OccurrenceKey`] and survives reloads for the lifetime of the daemon.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::signal::{ChangeSignal, Signal};
use crate::event::{EventDefinition, EventStore, Occurrence, OccurrenceKey};
use crate::notifier::{Notification, Notifier};
use crate::schedule::recurrence;

pub const DEFAULT_LEAD_TIME_SECS: i64 = 300;
pub const DEFAULT_POLL_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60);

/// Source of the current time
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// What one reconciling pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Definitions the pass worked from
    pub definitions: usize,
    /// Occurrences produced by expansion
    pub occurrences: usize,
    /// Notifications dispatched during this pass
    pub notified: usize,
    /// Set when the store could not be read and the last snapshot was used
    pub store_error: Option<String>,
    /// Earliest instant at which a pending occurrence enters its lead window
    pub next_window: Option<DateTime<Utc>>,
}

pub struct Daemon<N: Notifier> {
    store: EventStore,
    notifier: N,
    lead_time: Duration,
    poll_interval: std::time::Duration,
    /// Last successfully loaded definitions
    snapshot: Vec<EventDefinition>,
    notified: HashSet<OccurrenceKey>,
}

impl<N: Notifier> Daemon<N> {
    pub fn new(store: EventStore, notifier: N) -> Self {
        Self {
            store,
            notifier,
            lead_time: Duration::seconds(DEFAULT_LEAD_TIME_SECS),
            poll_interval: DEFAULT_POLL_INTERVAL,
            snapshot: Vec::new(),
            notified: HashSet::new(),
        }
    }

    pub fn with_lead_time(mut self, lead_time: Duration) -> Self {
        self.lead_time = lead_time;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: std::time::Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Occurrences already notified and still in the future
    pub fn notified_count(&self) -> usize {
        self.notified.len()
    }

    /// Run one reload-expand-notify pass at `now`
    pub fn reconcile(&mut self, now: DateTime<Utc>) -> PassReport {
        let mut report = PassReport::default();

        match self.store.load() {
            Ok(definitions) => {
                if definitions.len() != self.snapshot.len() {
                    info!("Loaded {} events", definitions.len());
                }
                self.snapshot = definitions;
            }
            Err(e) => {
                warn!("{}; keeping {} previously loaded events", e, self.snapshot.len());
                report.store_error = Some(e.to_string());
            }
        }

        let horizon = self.expansion_horizon(now);
        let occurrences = recurrence::expand_until(&self.snapshot, now, horizon);
        report.definitions = self.snapshot.len();
        report.occurrences = occurrences.len();

        for occurrence in &occurrences {
            if !in_lead_window(occurrence, now, self.lead_time) {
                if let Some(opens) = window_opens(occurrence, now, self.lead_time) {
                    report.next_window = Some(report.next_window.map_or(opens, |t| t.min(opens)));
                }
                continue;
            }
            // Failed dispatches are not retried either
            if !self.notified.insert(occurrence.key()) {
                continue;
            }

            let notification = Notification::for_occurrence(occurrence);
            debug!("Notifying: {} | {}", notification.title, notification.body);
            if let Err(e) = self.notifier.notify(&notification.title, &notification.body) {
                warn!("Notification for '{}' failed: {}", occurrence.definition.name, e);
            }
            report.notified += 1;
        }

        // An occurrence at or before now can never re-enter the window
        let now_secs = now.timestamp();
        self.notified.retain(|key| key.at > now_secs);

        debug!(
            "Pass complete: {} events, {} occurrences, {} notified",
            report.definitions, report.occurrences, report.notified
        );
        report
    }

    /// Reconcile once, then again on every change signal or timeout until
    /// the signal closes. A wait never outlasts the poll interval, nor the
    /// moment the next pending occurrence enters its lead window.
    pub fn run<S: ChangeSignal, C: Clock>(&mut self, signal: &mut S, clock: &C) {
        info!("Watching {}", self.store.path().display());
        let mut now = clock.now();
        let mut report = self.reconcile(now);

        loop {
            let timeout = self.wait_budget(&report, now);
            match signal.wait(timeout) {
                Signal::Changed => info!("Detected modification in event store"),
                Signal::Timeout => debug!("Woke after {:?}", timeout),
                Signal::Error(message) => {
                    warn!("Change signal failed: {}; retrying in {:?}", message, timeout);
                    if signal.wait(timeout) == Signal::Closed {
                        info!("Stopping watcher");
                        return;
                    }
                }
                Signal::Closed => {
                    info!("Stopping watcher");
                    return;
                }
            }
            now = clock.now();
            report = self.reconcile(now);
        }
    }

    fn wait_budget(&self, report: &PassReport, now: DateTime<Utc>) -> std::time::Duration {
        report
            .next_window
            .and_then(|opens| (opens - now).to_std().ok())
            .map_or(self.poll_interval, |until_open| {
                until_open.min(self.poll_interval)
            })
    }

    /// Occurrences past `now + lead + poll` cannot matter before the next pass
    fn expansion_horizon(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let poll = Duration::from_std(self.poll_interval).unwrap_or(Duration::MAX);
        now.checked_add_signed(self.lead_time)
            .and_then(|t| t.checked_add_signed(poll))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// `0 < at - now <= lead_time`
fn in_lead_window(occurrence: &Occurrence<'_>, now: DateTime<Utc>, lead_time: Duration) -> bool {
    let until_start = occurrence.at - now;
    until_start > Duration::zero() && until_start <= lead_time
}

/// `at - lead_time`, when that is still ahead of `now`
fn window_opens(
    occurrence: &Occurrence<'_>,
    now: DateTime<Utc>,
    lead_time: Duration,
) -> Option<DateTime<Utc>> {
    occurrence
        .at
        .checked_sub_signed(lead_time)
        .filter(|opens| *opens > now)
}

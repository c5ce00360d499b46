//! Integration tests for the watch/notify daemon against a real store file

use chrono::{Duration, Utc};
use ssm::event::{EventDefinition, EventStore};
use ssm::notifier::{Notifier, NotifyError};
use ssm::watch::{Daemon, FileChangeSignal, SystemClock};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

#[derive(Clone, Default)]
struct SharedRecorder {
    titles: Arc<Mutex<Vec<String>>>,
}

impl SharedRecorder {
    fn titles(&self) -> Vec<String> {
        self.titles.lock().unwrap().clone()
    }

    fn wait_for(&self, count: usize) -> Vec<String> {
        let deadline = Instant::now() + std::time::Duration::from_secs(10);
        while Instant::now() < deadline {
            let titles = self.titles();
            if titles.len() >= count {
                return titles;
            }
            thread::sleep(std::time::Duration::from_millis(20));
        }
        self.titles()
    }
}

impl Notifier for SharedRecorder {
    fn notify(&self, title: &str, _body: &str) -> Result<(), NotifyError> {
        self.titles.lock().unwrap().push(title.to_string());
        Ok(())
    }
}

#[test]
fn test_daemon_notifies_appended_event_once() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("ssm.tsv");
    let writer = EventStore::new(&path);

    let recorder = SharedRecorder::default();
    let mut signal = FileChangeSignal::watch(&path).unwrap();
    let shutdown = signal.shutdown_handle();
    let mut daemon = Daemon::new(EventStore::new(&path), recorder.clone())
        .with_poll_interval(std::time::Duration::from_millis(200));

    let worker = thread::spawn(move || daemon.run(&mut signal, &SystemClock));

    writer
        .append(&EventDefinition::new(
            Utc::now() + Duration::seconds(120),
            "Standup",
            "room 4",
        ))
        .unwrap();
    assert_eq!(recorder.wait_for(1), vec!["ssm - Standup"]);

    // Another event far outside the lead window triggers a reload only
    writer
        .append(&EventDefinition::new(
            Utc::now() + Duration::days(2),
            "Later",
            "",
        ))
        .unwrap();
    thread::sleep(std::time::Duration::from_millis(600));

    shutdown.shutdown();
    worker.join().unwrap();

    assert_eq!(recorder.titles(), vec!["ssm - Standup"]);
}

#[test]
fn test_daemon_stops_on_shutdown_without_events() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("nested").join("ssm.tsv");

    let mut signal = FileChangeSignal::watch(&path).unwrap();
    let shutdown = signal.shutdown_handle();
    let mut daemon = Daemon::new(EventStore::new(&path), SharedRecorder::default());

    let worker = thread::spawn(move || daemon.run(&mut signal, &SystemClock));
    shutdown.shutdown();
    worker.join().unwrap();
}

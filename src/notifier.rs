//! Desktop notifications for upcoming events
//!
//! The daemon talks to a [`Notifier`]. The production implementation,
//! [`CommandNotifier`], runs an external program (by default `notify-send`)
//! with the title and body as its last two arguments. The program is never
//! waited on inline; a detached thread reaps it.

use std::process::{Command, Stdio};
use std::thread;

use serde::Deserialize;
use thiserror::Error;

use crate::event::Occurrence;
use crate::time::{format_timestamp, DateFormat};

const TITLE_PREFIX: &str = "ssm - ";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Failed to run notifier '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
}

/// Something that can show a notification
pub trait Notifier {
    fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError>;
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        (**self).notify(title, body)
    }
}

/// Rendered notification text for one occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

impl Notification {
    /// `ssm - <name>` / `<description>, <HH:MM>`
    pub fn for_occurrence(occurrence: &Occurrence<'_>) -> Self {
        let time = format_timestamp(occurrence.at, DateFormat::HourMinute);
        let description = &occurrence.definition.description;
        let body = if description.is_empty() {
            time
        } else {
            format!("{description}, {time}")
        };

        Self {
            title: format!("{TITLE_PREFIX}{}", occurrence.definition.name),
            body,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NotifierConfig {
    #[serde(default = "default_program")]
    pub program: String,

    /// Arguments placed before the title and body
    #[serde(default = "default_args")]
    pub args: Vec<String>,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
        }
    }
}

fn default_program() -> String {
    "notify-send".to_string()
}

fn default_args() -> Vec<String> {
    vec!["--app-name=ssm".to_string()]
}

/// Runs an external program per notification (fire-and-forget)
#[derive(Debug, Clone)]
pub struct CommandNotifier {
    program: String,
    args: Vec<String>,
}

impl CommandNotifier {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &NotifierConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Notifier for CommandNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(title)
            .arg(body)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| NotifyError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let program = self.program.clone();
        let reaper = thread::Builder::new()
            .name("ssm-notifier-reaper".to_string())
            .spawn(move || match child.wait() {
                Ok(status) if status.success() => {}
                Ok(status) => {
                    tracing::warn!("Notifier '{}' exited with {}", program, status);
                }
                Err(e) => {
                    tracing::warn!("Failed to wait for notifier '{}': {}", program, e);
                }
            });

        if let Err(e) = reaper {
            // Without a reaper the child lingers as a zombie until we exit
            tracing::warn!("Failed to start notifier reaper thread: {}", e);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventDefinition;
    use chrono::{Local, TimeZone, Utc};

    #[test]
    fn test_notification_rendering() {
        let start = Local
            .with_ymd_and_hms(2026, 10, 18, 9, 5, 0)
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        let def = EventDefinition::new(start, "Standup", "Room 4");
        let notification = Notification::for_occurrence(&Occurrence::new(&def, start));
        assert_eq!(notification.title, "ssm - Standup");
        assert_eq!(notification.body, "Room 4, 09:05");

        let bare = EventDefinition::new(start, "Call", "");
        let notification = Notification::for_occurrence(&Occurrence::new(&bare, start));
        assert_eq!(notification.body, "09:05");
    }

    #[test]
    fn test_notifier_config_defaults() {
        let config: NotifierConfig = toml::from_str("").unwrap();
        assert_eq!(config, NotifierConfig::default());
        assert_eq!(config.program, "notify-send");
    }

    #[test]
    fn test_missing_program_reports_spawn_error() {
        let notifier = CommandNotifier::new("ssm-definitely-not-installed", Vec::new());
        let err = notifier.notify("title", "body").unwrap_err();
        assert!(matches!(err, NotifyError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_notifier_returns_without_waiting() {
        let notifier = CommandNotifier::new("sleep", Vec::new());
        let started = std::time::Instant::now();
        // `sleep <title> <body>`: both arguments parse as seconds
        notifier.notify("2", "0").unwrap();
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
    }
}

//! Store change signal
//!
//! The daemon only needs a blocking "wait until the store changes or the
//! timeout elapses" primitive. [`FileChangeSignal`] provides it on top of the
//! `notify` crate by watching the store's parent directory, so a store that
//! does not exist yet, or one an editor replaces by renaming, is still seen.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::{Duration, Instant};

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;

/// Outcome of one wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// The store was created, modified, or replaced
    Changed,
    /// Nothing happened within the timeout
    Timeout,
    /// The underlying watch failed
    Error(String),
    /// Shutdown was requested
    Closed,
}

pub trait ChangeSignal {
    /// Block for at most `timeout`
    fn wait(&mut self, timeout: Duration) -> Signal;
}

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Store path has no file name: {}", .0.display())]
    NoFileName(PathBuf),

    #[error("Failed to watch store directory: {0}")]
    Notify(#[from] notify::Error),

    #[error("Failed to create store directory: {0}")]
    Io(#[from] std::io::Error),
}

enum Message {
    Fs(notify::Result<notify::Event>),
    Shutdown,
}

/// Requests shutdown of a running [`FileChangeSignal`]
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: Sender<Message>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        // Receiver already gone means the daemon has stopped
        let _ = self.tx.send(Message::Shutdown);
    }
}

pub struct FileChangeSignal {
    // Dropping the watcher releases the OS watch handle
    _watcher: RecommendedWatcher,
    rx: Receiver<Message>,
    tx: Sender<Message>,
    file_name: OsString,
    closed: bool,
}

impl FileChangeSignal {
    pub fn watch(store_path: &Path) -> Result<Self, WatchError> {
        let file_name = store_path
            .file_name()
            .ok_or_else(|| WatchError::NoFileName(store_path.to_path_buf()))?
            .to_os_string();

        let dir = match store_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let (tx, rx) = mpsc::channel();
        let fs_tx = tx.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let _ = fs_tx.send(Message::Fs(res));
        })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::debug!("Watching {} for changes to {:?}", dir.display(), file_name);

        Ok(Self {
            _watcher: watcher,
            rx,
            tx,
            file_name,
            closed: false,
        })
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: self.tx.clone(),
        }
    }

    fn is_store_change(&self, event: &notify::Event) -> bool {
        // Access events are excluded: our own reloads would trigger them
        let writes = matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) | EventKind::Any
        );
        writes
            && event
                .paths
                .iter()
                .any(|p| p.file_name() == Some(self.file_name.as_os_str()))
    }

    /// Coalesce queued events into the change already reported
    fn drain(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(Message::Shutdown) => {
                    self.closed = true;
                    return;
                }
                Ok(Message::Fs(_)) => continue,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return,
            }
        }
    }
}

impl ChangeSignal for FileChangeSignal {
    fn wait(&mut self, timeout: Duration) -> Signal {
        if self.closed {
            return Signal::Closed;
        }

        // No deadline means wait until something arrives
        let deadline = Instant::now().checked_add(timeout);
        loop {
            let remaining = deadline.map_or(timeout, |d| d.saturating_duration_since(Instant::now()));
            match self.rx.recv_timeout(remaining) {
                Ok(Message::Shutdown) => {
                    self.closed = true;
                    return Signal::Closed;
                }
                Ok(Message::Fs(Ok(event))) => {
                    if self.is_store_change(&event) {
                        self.drain();
                        return Signal::Changed;
                    }
                }
                Ok(Message::Fs(Err(e))) => return Signal::Error(e.to_string()),
                Err(RecvTimeoutError::Timeout) => return Signal::Timeout,
                Err(RecvTimeoutError::Disconnected) => {
                    self.closed = true;
                    return Signal::Closed;
                }
            }
        }
    }
}

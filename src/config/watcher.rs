//! Filesystem watch with debounced reload triggers.
//!
//! The `notify` backend watches the directory holding the config file, so
//! a save that replaces the file (write a temp file, rename it over the
//! original) keeps being observed. Raw events go into an unbounded
//! channel; one Tokio task owns the receiving end and runs a small
//! debounce state machine:
//!
//! ```text
//! Idle ──write event──▶ Pending(deadline) ──write event──▶ Pending(now + quiet)
//!                              │
//!                              └──deadline elapses──▶ fire trigger ──▶ Idle
//! ```
//!
//! Both the timer and incoming events are handled by the same task, so a
//! rearm can never race a firing timer. An event qualifies when it names
//! the config file and creates it, writes its data, or renames something
//! onto it. Metadata and access events are ignored, as is anything about
//! sibling files. Transport errors from the backend are logged and the
//! loop keeps going. The loop ends when the channel closes (the
//! [`RecommendedWatcher`] is dropped), and any pending deadline is
//! dropped with it.

use std::ffi::{OsStr, OsString};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as _};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::error::HotcfgError;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

pub type RawEvents = mpsc::UnboundedReceiver<notify::Result<Event>>;

/// An active watch on one resolved config file.
///
/// Dropping the handle stops the watch; [`WatchHandle::stop`] also waits
/// for the event loop to wind down.
pub struct WatchHandle {
    path: PathBuf,
    watcher: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl std::fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchHandle")
            .field("path", &self.path)
            .field("finished", &self.task.is_finished())
            .finish()
    }
}

impl WatchHandle {
    pub async fn stop(self) {
        let Self {
            path,
            watcher,
            task,
        } = self;
        // Dropping the backend drops its sender, which closes the channel.
        drop(watcher);
        if let Err(e) = task.await {
            tracing::error!(path = %path.display(), error = %e, "config watcher task failed");
        }
        tracing::info!(path = %path.display(), "config watcher stopped");
    }
}

pub struct Watcher;

impl Watcher {
    /// Start observing `path`, calling `on_trigger` once per quiet period
    /// that follows a burst of writes to it.
    ///
    /// The watch is attached to the parent directory, which must exist.
    /// Fails if the notification backend cannot be created or the
    /// directory cannot be attached to it. Must be called from within a
    /// Tokio runtime.
    pub fn start<F, Fut>(
        path: &Path,
        quiet_period: Duration,
        on_trigger: F,
    ) -> Result<WatchHandle, HotcfgError>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let watch_err = |source| HotcfgError::Watch {
            path: path.to_path_buf(),
            source,
        };

        let file_name = path
            .file_name()
            .map(OsString::from)
            .ok_or_else(|| watch_err(notify::Error::generic("config path has no file name")))?;
        let dir = watch_dir(path);
        if !dir.is_dir() {
            return Err(watch_err(
                notify::Error::generic("config directory is not a directory")
                    .add_path(dir.to_path_buf()),
            ));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            // The receiver is gone only during teardown.
            let _ = tx.send(res);
        })
        .map_err(watch_err)?;

        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(watch_err)?;

        let task = tokio::spawn(debounce_loop(rx, file_name, quiet_period, on_trigger));

        tracing::info!(
            path = %path.display(),
            dir = %dir.display(),
            debounce_ms = u64::try_from(quiet_period.as_millis()).unwrap_or(u64::MAX),
            "config watcher started"
        );

        Ok(WatchHandle {
            path: path.to_path_buf(),
            watcher,
            task,
        })
    }
}

/// Directory holding `path`; a bare file name lives in the current directory.
fn watch_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Debounce {
    Idle,
    Pending(Instant),
}

impl Debounce {
    const fn deadline(self) -> Option<Instant> {
        match self {
            Self::Idle => None,
            Self::Pending(deadline) => Some(deadline),
        }
    }
}

/// Collapse bursts of events that write `file_name` into single triggers.
///
/// Runs until `events` is closed. A trigger is awaited before the next
/// event is looked at, so triggers never overlap.
pub async fn debounce_loop<F, Fut>(
    mut events: RawEvents,
    file_name: OsString,
    quiet_period: Duration,
    mut on_trigger: F,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut state = Debounce::Idle;

    loop {
        tokio::select! {
            received = events.recv() => match received {
                Some(Ok(event)) if is_write(&event.kind) && names_file(&event, &file_name) => {
                    state = Debounce::Pending(Instant::now() + quiet_period);
                }
                Some(Ok(event)) => {
                    tracing::trace!(kind = ?event.kind, paths = ?event.paths, "ignoring event");
                }
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "config watch error");
                }
                None => {
                    tracing::debug!("config watch channel closed");
                    return;
                }
            },
            () = wait_for(state.deadline()) => {
                state = Debounce::Idle;
                on_trigger().await;
            }
        }
    }
}

fn is_write(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Modify(
                ModifyKind::Data(_)
                    | ModifyKind::Any
                    | ModifyKind::Name(RenameMode::To | RenameMode::Both)
            )
    )
}

// Backends report paths relative to the watched directory or fully
// canonicalized, so only the final component is compared. A two-sided
// rename lists the source first; only its destination counts.
fn names_file(event: &Event, file_name: &OsStr) -> bool {
    let paths = match event.kind {
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            event.paths.get(1..).unwrap_or(&[])
        }
        _ => event.paths.as_slice(),
    };
    paths.iter().any(|p| p.file_name() == Some(file_name))
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

//! File-system trigger source for the Live Status Record.
//!
//! [`StatusWatcher`] watches the directory containing the record (not the
//! file itself) so that atomic write-and-rename updates are seen. Matching
//! events are forwarded into a bounded channel of capacity one with
//! `try_send`: while a trigger is already pending, further events are
//! dropped, so a burst of writes costs one re-read.

use std::path::{Path, PathBuf};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{AppError, Result};

/// Keeps the OS watch alive; dropping it stops event delivery.
pub struct StatusWatcher {
    _watcher: RecommendedWatcher,
    changes: mpsc::Receiver<()>,
}

impl std::fmt::Debug for StatusWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusWatcher").finish_non_exhaustive()
    }
}

impl StatusWatcher {
    /// Start watching the parent directory of `status_path`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Watch`] if the watcher cannot be created or the
    /// directory cannot be watched (for example because it does not exist).
    pub fn new(status_path: &Path) -> Result<Self> {
        let file_name = status_path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .ok_or_else(|| {
                AppError::Watch(format!(
                    "status path has no file name: {}",
                    status_path.display()
                ))
            })?;
        let watch_dir: PathBuf = status_path
            .parent()
            .filter(|p| p != &Path::new(""))
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        let (tx, changes) = mpsc::channel(1);

        let mut watcher = notify::recommended_watcher(
            move |result: std::result::Result<Event, notify::Error>| match result {
                Ok(event) if is_status_change(&event, &file_name) => {
                    if tx.try_send(()).is_err() {
                        debug!("status change coalesced into pending trigger");
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(%err, "status file watcher error");
                }
            },
        )
        .map_err(|err| AppError::Watch(format!("failed to create file watcher: {err}")))?;

        watcher
            .watch(&watch_dir, RecursiveMode::NonRecursive)
            .map_err(|err| {
                AppError::Watch(format!(
                    "failed to watch '{}': {err}",
                    watch_dir.display()
                ))
            })?;

        info!(dir = %watch_dir.display(), "watching for statusline updates");

        Ok(Self {
            _watcher: watcher,
            changes,
        })
    }

    /// Wait for the next change. Returns `None` if the watcher shut down.
    pub async fn changed(&mut self) -> Option<()> {
        self.changes.recv().await
    }
}

/// Check whether a notify event touches the status file.
fn is_status_change(event: &Event, file_name: &std::ffi::OsStr) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) && event
        .paths
        .iter()
        .any(|p| p.file_name().is_some_and(|name| name == file_name))
}

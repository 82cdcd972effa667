use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher, recommended_watcher};
use tokio::sync::mpsc;
use tracing::debug;

use super::ConfigError;

/// A change to the watched configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    /// Path that changed
    pub path: PathBuf,
    /// Kind of change
    pub kind: FileEventKind,
}

/// The type of file system change that occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEventKind {
    /// File was modified
    Modified,
    /// File was created
    Created,
    /// File was removed
    Removed,
}

/// Watches the configuration file for changes.
///
/// The parent directory is watched rather than the file itself so editors that
/// replace the file on save are still noticed. Events for other files in the
/// directory are dropped.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    path: PathBuf,
}

impl ConfigWatcher {
    /// Start watching `path` and return the receiver of its change events.
    ///
    /// # Errors
    /// Returns error if the path has no parent directory, or the underlying
    /// watcher cannot be initialized.
    pub fn watch(
        path: impl AsRef<Path>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<FileEvent>), ConfigError> {
        let path = path.as_ref().to_path_buf();
        let (Some(dir), Some(file_name)) = (path.parent(), path.file_name()) else {
            return Err(ConfigError::NoConfigDir(
                "configuration path has no parent directory",
            ));
        };
        let file_name = file_name.to_os_string();
        let dir = dir.to_path_buf();

        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let mut watcher = recommended_watcher(move |res: notify::Result<Event>| {
            let Ok(event) = res else {
                return;
            };
            let Some(kind) = classify(&event.kind) else {
                return;
            };

            for path in event.paths {
                if is_target(&path, &file_name) {
                    let _ = event_tx.send(FileEvent { path, kind });
                }
            }
        })?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        debug!(dir = %dir.display(), "Watching configuration directory");

        Ok((
            Self {
                _watcher: watcher,
                path,
            },
            event_rx,
        ))
    }

    /// File being watched.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn classify(kind: &EventKind) -> Option<FileEventKind> {
    match kind {
        EventKind::Create(_) => Some(FileEventKind::Created),
        EventKind::Modify(_) => Some(FileEventKind::Modified),
        EventKind::Remove(_) => Some(FileEventKind::Removed),
        _ => None,
    }
}

fn is_target(path: &Path, file_name: &OsString) -> bool {
    path.file_name() == Some(file_name.as_os_str())
}

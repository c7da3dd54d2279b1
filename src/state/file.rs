//! File-based state persistence implementation.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::network::AddressValue;

use super::{LoadResult, StateError, StateStore};

/// File-based implementation of [`StateStore`].
///
/// The file holds the address as plain text followed by a newline. Leading
/// and trailing whitespace is ignored when reading, so hand-edited files work.
///
/// # Atomic Writes
///
/// Uses write-to-temp-then-rename:
/// 1. Write to `{path}.tmp`
/// 2. Rename `{path}.tmp` to `{path}`
///
/// The file is therefore either the old value or the new one, never a
/// partial write. Loads and saves are also serialized through a lock shared
/// by all clones of the store.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl FileStateStore {
    /// Creates a new file-based state store at the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Returns the path to the state file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the temp path used during saves.
    ///
    /// Appends `.tmp` rather than replacing the extension
    /// (`last_ip.txt` -> `last_ip.txt.tmp`).
    fn temp_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn acquire(lock: &Mutex<()>) -> MutexGuard<'_, ()> {
        // The guarded data is `()`, so a poisoned lock carries no broken state.
        lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Performs the blocking save operation.
    ///
    /// Separated out so it can be wrapped in `spawn_blocking`.
    fn save_blocking(path: &Path, lock: &Mutex<()>, value: &str) -> Result<(), StateError> {
        let _guard = Self::acquire(lock);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(StateError::Write)?;
            }
        }

        let temp_path = Self::temp_path(path);
        std::fs::write(&temp_path, format!("{value}\n")).map_err(StateError::Write)?;

        if let Err(e) = std::fs::rename(&temp_path, path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(StateError::Write(e));
        }

        Ok(())
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> LoadResult {
        let _guard = Self::acquire(&self.lock);

        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return LoadResult::NotFound,
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return LoadResult::Corrupted {
                    reason: format!("State file is not valid UTF-8: {e}"),
                };
            }
            Err(e) => {
                return LoadResult::Unreadable {
                    reason: format!("Failed to read file: {e}"),
                };
            }
        };

        AddressValue::parse(&content).map_or(LoadResult::NotFound, LoadResult::Loaded)
    }

    async fn save(&self, value: &AddressValue) -> Result<(), StateError> {
        let path = self.path.clone();
        let lock = Arc::clone(&self.lock);
        let value = value.as_str().to_string();

        tokio::task::spawn_blocking(move || Self::save_blocking(&path, &lock, &value))
            .await
            .map_err(StateError::Task)?
    }
}

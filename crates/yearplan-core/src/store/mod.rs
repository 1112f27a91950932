//! Durable storage for [`AppState`].
//!
//! The state directory holds:
//!
//! * `state.json`: the whole plan, weekly reviews, and checklist, written as
//!   one versioned document.
//! * `active_view`: the last view the user opened, as plain text.
//! * `state.lock`: advisory lock serializing writers.
//!
//! Writes go to a temporary sibling and are renamed into place, so a crash
//! mid-write leaves the previous document intact.

pub mod format;
pub mod lock;
pub mod migrate;

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::PlanError;
use crate::model::AppState;
pub use format::StoredState;
pub use lock::StateLock;
pub use migrate::{CURRENT_VERSION, migrate_document};

pub const STATE_FILE: &str = "state.json";
pub const VIEW_FILE: &str = "active_view";
pub const LOCK_FILE: &str = "state.lock";

/// Environment variable that overrides the state directory.
pub const HOME_ENV: &str = "YEARPLAN_HOME";

const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
    lock_timeout: Duration,
}

impl StateStore {
    /// Store rooted at `dir`. Nothing is created until the first write.
    #[must_use]
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn state_path(&self) -> PathBuf {
        self.dir.join(STATE_FILE)
    }

    #[must_use]
    pub fn view_path(&self) -> PathBuf {
        self.dir.join(VIEW_FILE)
    }

    fn lock_path(&self) -> PathBuf {
        self.dir.join(LOCK_FILE)
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.state_path().is_file()
    }

    /// Load the stored state, migrating older documents in memory.
    ///
    /// Returns `Ok(None)` when no state has been written yet.
    ///
    /// # Errors
    ///
    /// * [`PlanError::CorruptState`] if the file is not a readable document.
    /// * [`PlanError::UnsupportedVersion`] if it was written by a newer build.
    /// * [`PlanError::Io`] / [`PlanError::LockTimeout`] on filesystem trouble.
    pub fn load(&self) -> Result<Option<AppState>, PlanError> {
        if !self.exists() {
            return Ok(None);
        }
        let _lock = StateLock::shared(&self.lock_path(), self.lock_timeout)?;
        self.read_unlocked().map(Some)
    }

    /// [`StateStore::load`], treating a missing file as an error.
    ///
    /// # Errors
    ///
    /// [`PlanError::NotInitialized`] when nothing is stored, otherwise the
    /// same as [`StateStore::load`].
    pub fn load_required(&self) -> Result<AppState, PlanError> {
        self.load()?
            .ok_or_else(|| PlanError::NotInitialized(self.dir.clone()))
    }

    /// Persist `state` atomically.
    ///
    /// # Errors
    ///
    /// [`PlanError::Io`] if the directory or file cannot be written, or
    /// [`PlanError::LockTimeout`] if another writer holds the lock.
    pub fn save(&self, state: &AppState) -> Result<(), PlanError> {
        let _lock = StateLock::exclusive(&self.lock_path(), self.lock_timeout)?;
        self.write_unlocked(state)
    }

    /// Read, transform, and write back under one exclusive lock.
    ///
    /// Nothing is written if `f` fails or returns an unchanged state.
    ///
    /// # Errors
    ///
    /// [`PlanError::NotInitialized`] when nothing is stored, load and save
    /// failures, and whatever `f` returns.
    pub fn update<T, E, F>(&self, f: F) -> Result<(AppState, T), E>
    where
        F: FnOnce(&AppState) -> Result<(AppState, T), E>,
        E: From<PlanError>,
    {
        let _lock = StateLock::exclusive(&self.lock_path(), self.lock_timeout)?;
        if !self.exists() {
            return Err(PlanError::NotInitialized(self.dir.clone()).into());
        }
        let current = self.read_unlocked()?;
        let (next, out) = f(&current)?;
        if next == current {
            debug!("state unchanged, skipping write");
        } else {
            self.write_unlocked(&next)?;
        }
        Ok((next, out))
    }

    /// Last view the user selected, if one was recorded.
    ///
    /// # Errors
    ///
    /// [`PlanError::Io`] for read failures other than a missing file.
    pub fn load_view(&self) -> Result<Option<String>, PlanError> {
        let path = self.view_path();
        match fs::read_to_string(&path) {
            Ok(raw) => {
                let view = raw.trim();
                Ok((!view.is_empty()).then(|| view.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PlanError::Io { path, source }),
        }
    }

    /// Record the active view name.
    ///
    /// # Errors
    ///
    /// [`PlanError::Io`] if the file cannot be written.
    pub fn save_view(&self, view: &str) -> Result<(), PlanError> {
        let path = self.view_path();
        write_atomic(&path, view.as_bytes())
    }

    fn read_unlocked(&self) -> Result<AppState, PlanError> {
        let path = self.state_path();
        let raw = fs::read_to_string(&path).map_err(|source| PlanError::Io {
            path: path.clone(),
            source,
        })?;
        let doc: serde_json::Value =
            serde_json::from_str(&raw).map_err(|source| PlanError::CorruptState {
                path: path.clone(),
                source,
            })?;
        let version = migrate::document_version(&doc);
        let doc = migrate_document(doc, version)?;
        let stored: StoredState =
            serde_json::from_value(doc).map_err(|source| PlanError::CorruptState {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), version, "loaded state");
        Ok(stored.into())
    }

    fn write_unlocked(&self, state: &AppState) -> Result<(), PlanError> {
        let path = self.state_path();
        let stored = StoredState::from(state);
        let body = serde_json::to_vec_pretty(&stored).map_err(|e| PlanError::Io {
            path: path.clone(),
            source: io::Error::other(e),
        })?;
        write_atomic(&path, &body)?;
        info!(path = %path.display(), bytes = body.len(), "saved state");
        Ok(())
    }
}

fn write_atomic(path: &Path, body: &[u8]) -> Result<(), PlanError> {
    let io_err = |source: io::Error| PlanError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let tmp = path.with_extension("tmp");
    let mut file = File::create(&tmp).map_err(io_err)?;
    file.write_all(body).map_err(io_err)?;
    file.sync_all().map_err(io_err)?;
    drop(file);
    fs::rename(&tmp, path).map_err(io_err)
}

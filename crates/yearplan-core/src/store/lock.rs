use fs2::FileExt;
use std::{
    fs::{self, File, OpenOptions},
    io,
    path::{Path, PathBuf},
    thread,
    time::{Duration, Instant},
};

use crate::error::PlanError;

const RETRY_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy)]
enum LockKind {
    Shared,
    Exclusive,
}

/// Advisory lock on the state directory. Released on drop.
#[derive(Debug)]
pub struct StateLock {
    file: File,
    path: PathBuf,
}

impl StateLock {
    /// Exclusive lock for read-modify-write cycles.
    ///
    /// # Errors
    ///
    /// [`PlanError::LockTimeout`] if another process holds the lock for
    /// longer than `timeout`, or [`PlanError::Io`] if the lock file cannot be
    /// opened.
    pub fn exclusive(path: &Path, timeout: Duration) -> Result<Self, PlanError> {
        Self::acquire(path, timeout, LockKind::Exclusive)
    }

    /// Shared lock for plain reads.
    ///
    /// # Errors
    ///
    /// Same as [`StateLock::exclusive`].
    pub fn shared(path: &Path, timeout: Duration) -> Result<Self, PlanError> {
        Self::acquire(path, timeout, LockKind::Shared)
    }

    fn acquire(path: &Path, timeout: Duration, kind: LockKind) -> Result<Self, PlanError> {
        let io_err = |source: io::Error| PlanError::Io {
            path: path.to_path_buf(),
            source,
        };
        let parent = path.parent().ok_or_else(|| {
            io_err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "lock path has no parent",
            ))
        })?;
        fs::create_dir_all(parent).map_err(io_err)?;

        let start = Instant::now();
        loop {
            let file = OpenOptions::new()
                .create(true)
                .read(true)
                .write(true)
                .truncate(false)
                .open(path)
                .map_err(io_err)?;

            let busy = match kind {
                LockKind::Shared => file.try_lock_shared().is_err(),
                LockKind::Exclusive => file.try_lock_exclusive().is_err(),
            };

            if !busy {
                return Ok(Self {
                    file,
                    path: path.to_path_buf(),
                });
            }

            if start.elapsed() >= timeout {
                return Err(PlanError::LockTimeout {
                    path: path.to_path_buf(),
                    waited: start.elapsed(),
                });
            }

            thread::sleep(RETRY_INTERVAL);
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

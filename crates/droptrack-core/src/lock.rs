//! Advisory lock on the data directory.
//!
//! One `dt` invocation holds it across load, mutate and save so two shells
//! never interleave writes to the same collection.

use crate::error::ErrorCode;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

/// File name of the lock inside a data directory.
pub const LOCK_FILE_NAME: &str = "lock";

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("data directory is busy: {} still locked after {waited:?}", path.display())]
    Contended { path: PathBuf, waited: Duration },

    #[error("cannot open data directory lock: {0}")]
    Io(#[from] io::Error),
}

impl LockError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Contended { .. } => ErrorCode::LockContention,
            Self::Io(_) => ErrorCode::StoreWriteFailed,
        }
    }

    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

/// Held for as long as the guard lives; unlocks on drop.
#[derive(Debug)]
pub struct DataDirLock {
    file: File,
    path: PathBuf,
}

impl DataDirLock {
    /// Lock `data_dir`, creating it first if needed, and wait up to `timeout`
    /// for another holder to let go.
    ///
    /// # Errors
    ///
    /// [`LockError::Contended`] when the timeout passes, [`LockError::Io`]
    /// when the directory or lock file cannot be created.
    pub fn acquire(data_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        fs::create_dir_all(data_dir)?;
        let path = data_dir.join(LOCK_FILE_NAME);
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)?;

        let started = Instant::now();
        while file.try_lock_exclusive().is_err() {
            let waited = started.elapsed();
            if waited >= timeout {
                return Err(LockError::Contended { path, waited });
            }
            thread::sleep(POLL_INTERVAL);
        }
        Ok(Self { file, path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DataDirLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

//! Single-instance guard: an exclusive, non-blocking lock on a file in the
//! scripts base directory, held for the life of the process so a second
//! `dsed` launched against the same directory fails fast instead of
//! racing the first for the host connection.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum SingleInstanceError {
    #[error("another instance is already running (lock held on {0})")]
    AlreadyRunning(PathBuf),

    #[error("could not open lock file {path}: {source}")]
    Open { path: PathBuf, #[source] source: std::io::Error },
}

/// Holds the lock file open; dropping releases the lock.
pub struct SingleInstanceGuard {
    _file: File,
    path: PathBuf,
}

impl SingleInstanceGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Acquire the lock at `dir/.dsed.lock`, creating the directory and
    /// file if needed. Fails immediately (never blocks) if another
    /// process already holds it.
    pub fn acquire(dir: &Path) -> Result<Self, SingleInstanceError> {
        std::fs::create_dir_all(dir).map_err(|source| SingleInstanceError::Open {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(".dsed.lock");
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)
            .map_err(|source| SingleInstanceError::Open { path: path.clone(), source })?;
        file.try_lock_exclusive().map_err(|_| SingleInstanceError::AlreadyRunning(path.clone()))?;
        Ok(SingleInstanceGuard { _file: file, path })
    }
}

#[cfg(test)]
#[path = "single_instance_tests.rs"]
mod tests;

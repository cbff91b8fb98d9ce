//! core::lock
//!
//! Exclusive lock on an import repository.
//!
//! # Architecture
//!
//! Imports build a strictly linear history: every commit's parent is the
//! previous snapshot. Two runs against the same repository would interleave
//! commits and tags, so an import holds this lock from the moment it reads
//! the repository's references until its last tag is written.
//!
//! # Storage
//!
//! - `<repo>/tarball-history.lock` - Lock file with OS-level exclusive lock
//!
//! # Invariants
//!
//! - Lock acquisition is non-blocking (fails fast if locked)
//! - Lock is released on drop, on every exit path

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

/// Lock file name inside the repository directory.
pub const LOCK_FILE: &str = "tarball-history.lock";

/// Errors from locking operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// Another process already holds the lock.
    #[error("repository is locked by another import: {0}")]
    AlreadyLocked(PathBuf),

    /// Failed to create or open the lock file.
    #[error("failed to create lock: {0}")]
    CreateFailed(String),

    /// Failed to acquire the OS lock.
    #[error("failed to acquire lock: {0}")]
    AcquireFailed(String),
}

/// An exclusive lock on an import repository.
///
/// Released when dropped.
#[derive(Debug)]
pub struct ImportLock {
    path: PathBuf,
    file: Option<File>,
}

impl ImportLock {
    /// Acquire the lock for the repository at `git_dir`.
    ///
    /// # Errors
    ///
    /// - [`LockError::AlreadyLocked`] if another process holds the lock
    /// - [`LockError::CreateFailed`] if the lock file cannot be opened
    /// - [`LockError::AcquireFailed`] if the OS lock cannot be taken
    pub fn acquire(git_dir: &Path) -> Result<Self, LockError> {
        let path = git_dir.join(LOCK_FILE);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| {
                LockError::CreateFailed(format!("cannot open {}: {}", path.display(), e))
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self {
                path,
                file: Some(file),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                Err(LockError::AlreadyLocked(path))
            }
            Err(e) => Err(LockError::AcquireFailed(e.to_string())),
        }
    }

    /// Check if the lock is currently held.
    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }

    /// Get the path to the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ImportLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = file.unlock();
        }
    }
}

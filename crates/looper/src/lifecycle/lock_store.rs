//! Persistent record of the pid that currently owns the instance.
//!
//! The record is a single decimal pid followed by a newline. Records are only
//! ever created exclusively, so two writers racing for an empty store cannot
//! both succeed. Readers tolerate surrounding whitespace and
//! report unparseable content as [`LockStoreError::Malformed`] so callers can
//! decide how to treat it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use super::LIFECYCLE_TARGET;
use super::files::exclusive_write;

/// Pid recorded by the instance that last acquired the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockRecord {
    pid: u32,
}

impl LockRecord {
    /// Builds a record for `pid`.
    pub const fn new(pid: u32) -> Self {
        Self { pid }
    }

    /// Recorded process identifier.
    pub const fn pid(self) -> u32 {
        self.pid
    }

    fn encode(self) -> String {
        format!("{}\n", self.pid)
    }

    fn decode(content: &str) -> Option<Self> {
        content.trim().parse::<u32>().ok().map(Self::new)
    }
}

/// Errors raised while reading or mutating the lock record.
#[derive(Debug, Error)]
pub enum LockStoreError {
    /// The record exists but could not be read.
    #[error("failed to read lock file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The record could not be written.
    #[error("failed to write lock file {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The record exists but could not be removed.
    #[error("failed to remove lock file {path:?}: {source}")]
    Clear {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The record does not contain a pid.
    #[error("lock file {path:?} does not contain a pid: {content:?}")]
    Malformed { path: PathBuf, content: String },
}

/// Storage for the single lock record.
///
/// Implementations must make [`LockStore::create`] exclusive, including
/// against other processes, and [`LockStore::clear`] idempotent.
pub trait LockStore: Send + Sync {
    /// Location reported to operators when the record needs manual attention.
    fn location(&self) -> &Path;

    /// Returns the current record, or `None` when no record exists.
    fn read(&self) -> Result<Option<LockRecord>, LockStoreError>;

    /// Stores `record` unless a record already exists.
    ///
    /// Returns `false`, leaving the existing record untouched, when another
    /// writer got there first.
    fn create(&self, record: LockRecord) -> Result<bool, LockStoreError>;

    /// Removes the record. Succeeds when no record exists.
    fn clear(&self) -> Result<(), LockStoreError>;
}

/// Lock store backed by a pid file.
#[derive(Debug, Clone)]
pub struct FileLockStore {
    path: PathBuf,
}

impl FileLockStore {
    /// Stores the record at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LockStore for FileLockStore {
    fn location(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<LockRecord>, LockStoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(LockStoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        LockRecord::decode(&content)
            .map(Some)
            .ok_or_else(|| LockStoreError::Malformed {
                path: self.path.clone(),
                content,
            })
    }

    fn create(&self, record: LockRecord) -> Result<bool, LockStoreError> {
        match exclusive_write(&self.path, record.encode().as_bytes()) {
            Ok(()) => {
                debug!(
                    target: LIFECYCLE_TARGET,
                    pid = record.pid(),
                    file = %self.path.display(),
                    "lock record created"
                );
                Ok(true)
            }
            Err(error) if error.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(source) => Err(LockStoreError::Write {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn clear(&self) -> Result<(), LockStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(
                    target: LIFECYCLE_TARGET,
                    file = %self.path.display(),
                    "lock record removed"
                );
                Ok(())
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(LockStoreError::Clear {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

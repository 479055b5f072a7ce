//! Derives the runtime artefact paths shared by every `looper` invocation.
//!
//! The lock file lives in the OS temporary directory under a name derived
//! from [`APP_ID`]. `start`, `stop`, and `status` all have to agree on this
//! location, so it is intentionally not configurable.

use std::env;
use std::path::{Path, PathBuf};

use crate::defaults::APP_ID;

/// Canonical paths for runtime artefacts written by a running instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimePaths {
    lock_path: PathBuf,
}

impl RuntimePaths {
    /// Paths used by production instances: `<temp dir>/looper.pid`.
    pub fn system() -> Self {
        Self::in_dir(&env::temp_dir())
    }

    /// Paths rooted at an explicit directory, mainly for tests.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            lock_path: dir.join(lock_file_name()),
        }
    }

    /// Path to the lock file guarding singleton startup.
    pub fn lock_path(&self) -> &Path {
        self.lock_path.as_path()
    }
}

/// File name of the lock record.
pub fn lock_file_name() -> String {
    format!("{APP_ID}.pid")
}

//! Error types for instance lifecycle operations.

use std::io;
use std::path::PathBuf;

use nix::errno::Errno;
use thiserror::Error;

use super::lock_store::LockStoreError;
use super::shutdown::ShutdownError;
use crate::autostart::AutostartError;
use crate::platform::PlatformError;
use crate::playback::PlaybackError;

/// Errors raised while executing lifecycle commands.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(
        "looper is already running with pid {pid}; if that process is gone, delete {lock_path:?} and retry"
    )]
    AlreadyRunning { pid: u32, lock_path: PathBuf },
    #[error("lock file {lock_path:?} kept changing while starting; retry")]
    LockContended { lock_path: PathBuf },
    #[error("looper is not running")]
    NotRunning,
    #[error("looper is already installed (autostart entry {path:?})")]
    AlreadyInstalled { path: PathBuf },
    #[error("looper is not installed")]
    NotInstalled,
    #[error(transparent)]
    LockStore(#[from] LockStoreError),
    #[error("refusing to signal pid {pid}")]
    InvalidPid { pid: u32 },
    #[error("failed to signal pid {pid}: {source}")]
    SignalFailed {
        pid: u32,
        #[source]
        source: Errno,
    },
    #[error("failed to resolve the running executable: {source}")]
    CurrentExecutable {
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Shutdown(#[from] ShutdownError),
    #[error(transparent)]
    Playback(#[from] PlaybackError),
    #[error(transparent)]
    Autostart(#[from] AutostartError),
    #[error(transparent)]
    Platform(#[from] PlatformError),
    #[error("failed to spawn signal listener: {0}")]
    ListenerSpawn(#[source] io::Error),
    #[error("signal listener thread panicked")]
    ListenerPanicked,
    #[error("failed to write lifecycle output: {0}")]
    Io(#[source] io::Error),
}

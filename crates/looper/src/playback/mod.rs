//! Looping audio playback.
//!
//! Playback is the payload of a running instance; the lifecycle only needs to
//! start it, poll it for completion and stop it.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[cfg(feature = "audio")]
mod rodio_engine;

#[cfg(feature = "audio")]
pub use rodio_engine::RodioEngine;

/// How many times the asset plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopCount {
    /// Loop until stopped.
    Infinite,
    /// Play exactly this many times.
    Finite(u32),
}

impl From<i64> for LoopCount {
    /// Negative counts loop forever; counts beyond `u32::MAX` saturate.
    fn from(count: i64) -> Self {
        match u64::try_from(count) {
            Ok(count) => Self::Finite(u32::try_from(count).unwrap_or(u32::MAX)),
            Err(_) => Self::Infinite,
        }
    }
}

/// Errors raised while starting playback.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("failed to open audio asset {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode audio asset {path:?}: {message}")]
    Decode { path: PathBuf, message: String },
    #[error("failed to open audio output: {message}")]
    Output { message: String },
    #[error("audio output support was not compiled in")]
    Unavailable,
}

/// Starts playback of an asset.
pub trait PlaybackEngine {
    /// Begins playing `asset` `loops` times.
    fn play(&self, asset: &Path, loops: LoopCount) -> Result<Box<dyn PlaybackHandle>, PlaybackError>;
}

/// A playback in progress.
pub trait PlaybackHandle {
    /// Whether every queued loop has finished.
    fn is_done(&self) -> bool;

    /// Stops playback and releases the output device.
    fn close(&mut self);
}

/// Engine used when the binary is built without audio support.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableEngine;

impl PlaybackEngine for UnavailableEngine {
    fn play(&self, _asset: &Path, _loops: LoopCount) -> Result<Box<dyn PlaybackHandle>, PlaybackError> {
        Err(PlaybackError::Unavailable)
    }
}

/// Engine for the current build.
#[cfg(feature = "audio")]
pub type SystemPlaybackEngine = RodioEngine;

/// Engine for the current build.
#[cfg(not(feature = "audio"))]
pub type SystemPlaybackEngine = UnavailableEngine;

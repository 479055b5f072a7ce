//! Runs an acquired instance until playback ends or a signal arrives.
//!
//! A listener thread blocks on the shutdown signal while the calling thread
//! polls playback. Both paths funnel into [`Release::release`], whose
//! compare-and-swap guarantees the lock is cleared exactly once.

use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::LIFECYCLE_TARGET;
use super::controller::Release;
use super::error::LifecycleError;
use super::shutdown::ShutdownSignal;
use crate::playback::PlaybackHandle;

/// Why a running instance returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Playback finished its configured loops.
    Completed,
    /// A termination signal interrupted playback.
    Interrupted { signal: i32 },
}

/// Supervises playback for an instance that already holds the lock.
pub struct ShutdownCoordinator<R> {
    release: Arc<R>,
    poll: Duration,
}

impl<R> ShutdownCoordinator<R>
where
    R: Release + 'static,
{
    /// Builds a coordinator that checks playback every `poll`.
    pub fn new(release: Arc<R>, poll: Duration) -> Self {
        Self { release, poll }
    }

    /// Blocks until playback completes or `signal` fires.
    ///
    /// The listener must be armed before the lock was acquired so that a
    /// signal delivered in between is not lost. Playback is closed and the
    /// lock released before this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener thread cannot be spawned or panics,
    /// or if releasing the lock fails on either path.
    pub fn run(
        &self,
        signal: Arc<dyn ShutdownSignal>,
        mut playback: Box<dyn PlaybackHandle>,
    ) -> Result<ExitReason, LifecycleError> {
        let (sender, receiver) = mpsc::channel::<(i32, Result<(), LifecycleError>)>();
        let listener = {
            let signal = Arc::clone(&signal);
            let release = Arc::clone(&self.release);
            thread::Builder::new()
                .name("looper-signals".to_owned())
                .spawn(move || match signal.wait() {
                    Ok(Some(number)) => {
                        let released = release.release().map(|_| ());
                        if let Err(error) = &released {
                            error!(
                                target: LIFECYCLE_TARGET,
                                error = %error,
                                "failed to release lock after signal"
                            );
                        }
                        if sender.send((number, released)).is_err() {
                            debug!(target: LIFECYCLE_TARGET, "coordinator finished before signal");
                        }
                    }
                    Ok(None) => {}
                    Err(error) => {
                        warn!(
                            target: LIFECYCLE_TARGET,
                            error = %error,
                            "shutdown listener failed"
                        );
                    }
                })
                .map_err(LifecycleError::ListenerSpawn)?
        };

        let (reason, mut released) = loop {
            match receiver.recv_timeout(self.poll) {
                Ok((number, released)) => {
                    break (ExitReason::Interrupted { signal: number }, released);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => thread::sleep(self.poll),
            }
            if playback.is_done() {
                break (ExitReason::Completed, Ok(()));
            }
        };

        playback.close();
        if reason == ExitReason::Completed {
            released = self.release.release().map(|_| ());
        }
        signal.disarm();
        if listener.join().is_err() {
            return Err(LifecycleError::ListenerPanicked);
        }
        // A signal landing after completion may have won the release.
        if let Ok((_, late)) = receiver.try_recv() {
            released = released.and(late);
        }
        released?;
        info!(target: LIFECYCLE_TARGET, reason = ?reason, "instance finished");
        Ok(reason)
    }
}

//! Termination signal listener.

use std::io;
use std::sync::{Mutex, PoisonError};

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::{Handle, Signals};
use thiserror::Error;
use tracing::info;

use super::LIFECYCLE_TARGET;

/// Abstraction over shutdown notification mechanisms.
pub trait ShutdownSignal: Send + Sync {
    /// Blocks until a termination signal arrives or the listener is disarmed.
    ///
    /// Returns the signal number, or `None` after [`ShutdownSignal::disarm`].
    fn wait(&self) -> Result<Option<i32>, ShutdownError>;

    /// Wakes any pending [`ShutdownSignal::wait`] and stops listening.
    fn disarm(&self);
}

/// Produces armed shutdown listeners.
pub trait ShutdownSignalSource {
    /// Installs a listener. Signals arriving after this call are captured.
    fn arm(&self) -> Result<Box<dyn ShutdownSignal>, ShutdownError>;
}

/// Errors reported by shutdown signal listeners.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Listener for interrupt, terminate, quit and hangup.
pub struct SystemShutdownSignal {
    signals: Mutex<Signals>,
    handle: Handle,
}

impl SystemShutdownSignal {
    /// Registers the process-wide handlers.
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownError::Install`] when registration fails.
    pub fn install() -> Result<Self, ShutdownError> {
        let signals = Signals::new([SIGTERM, SIGINT, SIGQUIT, SIGHUP])
            .map_err(|source| ShutdownError::Install { source })?;
        let handle = signals.handle();
        Ok(Self {
            signals: Mutex::new(signals),
            handle,
        })
    }
}

impl ShutdownSignal for SystemShutdownSignal {
    fn wait(&self) -> Result<Option<i32>, ShutdownError> {
        let mut signals = self.signals.lock().unwrap_or_else(PoisonError::into_inner);
        let received = signals.forever().next();
        if let Some(signal) = received {
            info!(target: LIFECYCLE_TARGET, signal, "shutdown signal received");
        }
        Ok(received)
    }

    fn disarm(&self) {
        self.handle.close();
    }
}

/// Source of [`SystemShutdownSignal`] listeners.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSignalSource;

impl ShutdownSignalSource for SystemSignalSource {
    fn arm(&self) -> Result<Box<dyn ShutdownSignal>, ShutdownError> {
        Ok(Box::new(SystemShutdownSignal::install()?))
    }
}

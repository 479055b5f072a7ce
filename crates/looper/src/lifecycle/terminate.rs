//! Delivers stop signals to another instance.

use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use tracing::info;

use super::LIFECYCLE_TARGET;
use super::error::LifecycleError;
use super::identity::to_raw_pid;

/// How forcefully a process is asked to exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Catchable request; the target releases its lock before exiting.
    Graceful,
    /// Uncatchable kill used once the grace period has lapsed.
    Forced,
}

impl Termination {
    const fn signal(self) -> Signal {
        match self {
            Self::Graceful => Signal::SIGTERM,
            Self::Forced => Signal::SIGKILL,
        }
    }
}

/// Sends termination requests to processes.
pub trait ProcessTerminator: Send + Sync {
    /// Signals `pid`. A process that has already exited is not an error.
    fn terminate(&self, pid: u32, mode: Termination) -> Result<(), LifecycleError>;
}

/// Terminator that uses `kill(2)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalTerminator;

impl ProcessTerminator for SignalTerminator {
    fn terminate(&self, pid: u32, mode: Termination) -> Result<(), LifecycleError> {
        let raw = to_raw_pid(pid).ok_or(LifecycleError::InvalidPid { pid })?;
        let signal = mode.signal();
        match kill(Pid::from_raw(raw), signal) {
            Ok(()) => {
                info!(
                    target: LIFECYCLE_TARGET,
                    pid,
                    signal = signal.as_str(),
                    "stop signal delivered"
                );
                Ok(())
            }
            Err(Errno::ESRCH) => Ok(()),
            Err(errno) => Err(LifecycleError::SignalFailed { pid, source: errno }),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::os::unix::process::ExitStatusExt;
    use std::process::Command;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::graceful(Termination::Graceful, 15)]
    #[case::forced(Termination::Forced, 9)]
    fn delivers_the_matching_signal(#[case] mode: Termination, #[case] expected: i32) {
        let mut child = Command::new("sleep").arg("30").spawn().expect("spawn sleep");
        SignalTerminator
            .terminate(child.id(), mode)
            .expect("signal delivery");
        let status = child.wait().expect("reap sleep");
        assert_eq!(status.signal(), Some(expected));
    }

    #[test]
    fn exited_process_is_not_an_error() {
        let mut child = Command::new("true").spawn().expect("spawn true");
        let pid = child.id();
        child.wait().expect("reap true");
        SignalTerminator
            .terminate(pid, Termination::Graceful)
            .expect("missing process should be tolerated");
    }

    #[test]
    fn pid_zero_is_refused() {
        let error = SignalTerminator
            .terminate(0, Termination::Graceful)
            .expect_err("pid zero must not be signalled");
        assert!(matches!(error, LifecycleError::InvalidPid { pid: 0 }));
    }
}

//! Checks whether a recorded pid still belongs to this program.
//!
//! Pids are recycled by the kernel, so a bare liveness probe is not enough: a
//! record left behind by a crashed instance may name an unrelated process. The
//! verifier compares the executable image of the candidate with our own.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;
use tracing::{debug, warn};

use super::LIFECYCLE_TARGET;
use super::error::LifecycleError;

/// Decides whether a pid names a live instance of the current program.
pub trait ProcessIdentity: Send + Sync {
    /// Returns `true` only when `pid` is alive and runs the same executable.
    ///
    /// Any failure to inspect the process counts as `false`.
    fn is_same_program_running(&self, pid: u32) -> bool;
}

/// Verifier backed by the `/proc` process table.
#[derive(Debug, Clone)]
pub struct ProcTableIdentity {
    executable: PathBuf,
    proc_root: PathBuf,
}

impl ProcTableIdentity {
    /// Builds a verifier for the running executable.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::CurrentExecutable`] when the executable path
    /// cannot be resolved.
    pub fn for_current_process() -> Result<Self, LifecycleError> {
        let executable =
            std::env::current_exe().map_err(|source| LifecycleError::CurrentExecutable { source })?;
        Ok(Self::new(executable))
    }

    /// Builds a verifier that treats `executable` as our own image.
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            proc_root: PathBuf::from("/proc"),
        }
    }

    /// Executable the verifier compares candidates against.
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    fn executable_of(&self, pid: u32) -> io::Result<PathBuf> {
        fs::read_link(self.proc_root.join(pid.to_string()).join("exe"))
    }
}

impl ProcessIdentity for ProcTableIdentity {
    fn is_same_program_running(&self, pid: u32) -> bool {
        if !is_alive(pid) {
            return false;
        }
        match self.executable_of(pid) {
            Ok(image) => {
                let same = image == self.executable;
                if !same {
                    debug!(
                        target: LIFECYCLE_TARGET,
                        pid,
                        image = %image.display(),
                        "pid belongs to a different program"
                    );
                }
                same
            }
            Err(error) => {
                debug!(
                    target: LIFECYCLE_TARGET,
                    pid,
                    error = %error,
                    "could not inspect process image"
                );
                false
            }
        }
    }
}

/// Probes `pid` with the null signal.
///
/// Pid zero and values outside the kernel's pid range are never alive; they
/// would otherwise address process groups.
pub(crate) fn is_alive(pid: u32) -> bool {
    let Some(raw) = to_raw_pid(pid) else {
        return false;
    };
    match kill(Pid::from_raw(raw), None) {
        Ok(()) | Err(Errno::EPERM) => true,
        Err(Errno::ESRCH) => false,
        Err(errno) => {
            warn!(
                target: LIFECYCLE_TARGET,
                pid,
                error = %errno,
                "liveness probe failed"
            );
            false
        }
    }
}

pub(crate) fn to_raw_pid(pid: u32) -> Option<i32> {
    match i32::try_from(pid) {
        Ok(raw) if raw > 0 => Some(raw),
        _ => None,
    }
}

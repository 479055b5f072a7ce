//! Lifecycle command types and output abstractions.

use std::fmt;
use std::io::Write;

use super::LifecycleError;

/// Supported lifecycle commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleCommand {
    Start,
    Stop,
    Status,
    Install,
    Uninstall,
}

impl fmt::Display for LifecycleCommand {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Status => "status",
            Self::Install => "install",
            Self::Uninstall => "uninstall",
        })
    }
}

/// Line-oriented writer for command results. Failures travel back as
/// [`LifecycleError`] and are reported by the caller.
pub struct LifecycleOutput<W: Write> {
    pub stdout: W,
}

impl<W: Write> LifecycleOutput<W> {
    pub fn new(stdout: W) -> Self {
        Self { stdout }
    }

    pub fn stdout_line(&mut self, args: fmt::Arguments<'_>) -> Result<(), LifecycleError> {
        self.stdout.write_fmt(args).map_err(LifecycleError::Io)?;
        self.stdout.write_all(b"\n").map_err(LifecycleError::Io)?;
        self.stdout.flush().map_err(LifecycleError::Io)
    }
}

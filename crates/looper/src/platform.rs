//! Refuses to run on hosts the lifecycle cannot manage.
//!
//! Process identity relies on `/proc/<pid>/exe`, so only Linux kernels are
//! accepted, and only from release 3.0 onward.

use thiserror::Error;
use tracing::debug;

const PLATFORM_TARGET: &str = "looper::platform";

/// Oldest kernel release accepted.
pub const MINIMUM_KERNEL: KernelVersion = KernelVersion { major: 3, minor: 0 };

/// Major and minor kernel release numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct KernelVersion {
    pub major: u32,
    pub minor: u32,
}

impl KernelVersion {
    /// Parses the leading `major.minor` of a release string such as
    /// `6.8.0-45-generic`.
    pub fn parse(release: &str) -> Option<Self> {
        let mut numbers = release
            .split(|character: char| !character.is_ascii_digit())
            .map(str::parse::<u32>);
        let major = numbers.next()?.ok()?;
        let minor = numbers.next().and_then(Result::ok).unwrap_or(0);
        Some(Self { major, minor })
    }
}

/// Errors raised when the host is unsupported.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("unsupported operating system '{os}'; looper requires Linux")]
    UnsupportedOs { os: &'static str },
    #[error("unsupported kernel release '{release}'; looper requires Linux 3.0 or newer")]
    UnsupportedKernel { release: String },
    #[error("failed to query the kernel release: {0}")]
    Uname(#[source] nix::errno::Errno),
}

/// Checks that the host can run lifecycle operations.
pub trait PlatformGate {
    /// Succeeds when the host is supported.
    fn check(&self) -> Result<(), PlatformError>;
}

/// Gate that inspects the running kernel.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPlatformGate;

impl PlatformGate for SystemPlatformGate {
    #[cfg(target_os = "linux")]
    fn check(&self) -> Result<(), PlatformError> {
        let uts = nix::sys::utsname::uname().map_err(PlatformError::Uname)?;
        let release = uts.release().to_string_lossy().into_owned();
        debug!(target: PLATFORM_TARGET, release = %release, "kernel release detected");
        check_release(&release)
    }

    #[cfg(not(target_os = "linux"))]
    fn check(&self) -> Result<(), PlatformError> {
        debug!(target: PLATFORM_TARGET, os = std::env::consts::OS, "non-linux host");
        Err(PlatformError::UnsupportedOs {
            os: std::env::consts::OS,
        })
    }
}

/// Accepts `release` when it parses to at least [`MINIMUM_KERNEL`].
pub fn check_release(release: &str) -> Result<(), PlatformError> {
    match KernelVersion::parse(release) {
        Some(version) if version >= MINIMUM_KERNEL => Ok(()),
        _ => Err(PlatformError::UnsupportedKernel {
            release: release.to_owned(),
        }),
    }
}

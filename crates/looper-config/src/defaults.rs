use camino::Utf8PathBuf;

use crate::logging::LogFormat;

/// Fixed application identifier shared by every instance on the host.
///
/// The lock file name and the autostart entry are both derived from it, so
/// it must never vary per invocation.
pub const APP_ID: &str = "looper";

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default audio asset, resolved against the executable directory.
pub const DEFAULT_ASSET_PATH: &str = "silence.mp3";

/// Loop count meaning "repeat until told to stop".
pub const INFINITE_LOOPS: i64 = -1;

/// Default interval between playback completion checks.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

/// Default time a stopped instance gets to exit before it is killed.
pub const DEFAULT_STOP_GRACE_MS: u64 = 5_000;

/// Default log filter expression used by the binary.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binary.
pub fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Default audio asset path.
pub fn default_asset_path() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_ASSET_PATH)
}

/// Default loop count.
pub const fn default_loop_count() -> i64 {
    INFINITE_LOOPS
}

/// Default completion poll interval in milliseconds.
pub const fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

/// Default stop grace period in milliseconds.
pub const fn default_stop_grace_ms() -> u64 {
    DEFAULT_STOP_GRACE_MS
}

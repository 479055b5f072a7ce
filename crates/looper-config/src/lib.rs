//! Shared configuration for the `looper` utility.
//!
//! Configuration is layered by [`ortho_config`]: built-in defaults, then an
//! optional configuration file (`--config-path` or `LOOPER_CONFIG_PATH`),
//! then `LOOPER_*` environment variables, and finally command-line flags.
//! The crate also owns the runtime path layout so every invocation agrees on
//! where the instance lock lives.

use std::path::{Path, PathBuf};
use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

mod defaults;
mod logging;
mod runtime;

pub use defaults::{
    APP_ID, DEFAULT_ASSET_PATH, DEFAULT_LOG_FILTER, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_STOP_GRACE_MS, INFINITE_LOOPS, default_asset_path, default_log_filter,
    default_log_filter_string, default_log_format, default_loop_count, default_poll_interval_ms,
    default_stop_grace_ms,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use ortho_config::OrthoError;
pub use runtime::{RuntimePaths, lock_file_name};

/// Resolved configuration for a single `looper` invocation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "LOOPER")]
pub struct Config {
    /// `tracing` filter expression applied to the log subscriber.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for log records.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Audio asset to loop; relative paths resolve against the executable.
    #[ortho_config(default = default_asset_path())]
    pub asset_path: Utf8PathBuf,
    /// Number of times the asset plays; negative values loop forever.
    #[ortho_config(default = default_loop_count())]
    pub loop_count: i64,
    /// Interval between playback completion checks, in milliseconds.
    #[ortho_config(default = default_poll_interval_ms())]
    pub poll_interval_ms: u64,
    /// Grace period granted to a stopped instance before it is killed.
    #[ortho_config(default = default_stop_grace_ms())]
    pub stop_grace_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            asset_path: default_asset_path(),
            loop_count: default_loop_count(),
            poll_interval_ms: default_poll_interval_ms(),
            stop_grace_ms: default_stop_grace_ms(),
        }
    }
}

impl Config {
    /// Log filter expression.
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Configured loop count; negative means infinite.
    pub const fn loop_count(&self) -> i64 {
        self.loop_count
    }

    /// Interval between playback completion checks.
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Grace period before a stop request escalates to a forced kill.
    pub const fn stop_grace(&self) -> Duration {
        Duration::from_millis(self.stop_grace_ms)
    }

    /// Resolves the asset path, anchoring relative paths at `base_dir`.
    ///
    /// The binary passes the directory containing its own executable so the
    /// asset shipped next to it is found regardless of the working directory.
    pub fn resolve_asset_path(&self, base_dir: &Path) -> PathBuf {
        let asset = self.asset_path.as_std_path();
        if asset.is_absolute() {
            asset.to_path_buf()
        } else {
            base_dir.join(asset)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_loop_forever() {
        let config = Config::default();
        assert_eq!(config.loop_count(), INFINITE_LOOPS);
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.stop_grace(), Duration::from_secs(5));
    }

    #[test]
    fn relative_asset_resolves_against_base() {
        let config = Config::default();
        let resolved = config.resolve_asset_path(Path::new("/opt/looper"));
        assert_eq!(resolved, Path::new("/opt/looper").join(DEFAULT_ASSET_PATH));
    }

    #[test]
    fn absolute_asset_is_kept() {
        let config = Config {
            asset_path: Utf8PathBuf::from("/srv/audio/loop.mp3"),
            ..Config::default()
        };
        let resolved = config.resolve_asset_path(Path::new("/opt/looper"));
        assert_eq!(resolved, Path::new("/srv/audio/loop.mp3"));
    }
}

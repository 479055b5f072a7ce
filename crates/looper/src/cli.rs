//! Command-line interface definition for `looper`.

use clap::{Parser, Subcommand};

use crate::lifecycle::LifecycleCommand;

const CONFIG_HELP: &str = "\
Configuration flags (before the command):
  --config-path <PATH>         Read settings from a TOML file
  --log-filter <FILTER>        tracing filter expression [default: info]
  --log-format <FORMAT>        compact or json [default: compact]
  --asset-path <PATH>          Audio asset; relative paths resolve next to the binary
  --loop-count <N>             Times to play the asset; negative loops forever [default: -1]
  --poll-interval-ms <MS>      Playback completion check interval [default: 1000]
  --stop-grace-ms <MS>         Grace period before `stop` kills the instance [default: 5000]

Every flag also reads from a LOOPER_* environment variable.";

/// Keeps one looping audio instance alive in the background.
#[derive(Parser, Debug)]
#[command(
    name = "looper",
    version,
    disable_help_subcommand = true,
    arg_required_else_help = true,
    after_help = CONFIG_HELP
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Lifecycle verbs.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CliCommand {
    /// Acquire the instance lock and play until stopped.
    Start,
    /// Stop the running instance.
    Stop,
    /// Report whether an instance is running and whether autostart is installed.
    Status,
    /// Start looper automatically at login.
    Install,
    /// Remove the login autostart entry.
    Uninstall,
}

impl From<CliCommand> for LifecycleCommand {
    fn from(command: CliCommand) -> Self {
        match command {
            CliCommand::Start => Self::Start,
            CliCommand::Stop => Self::Stop,
            CliCommand::Status => Self::Status,
            CliCommand::Install => Self::Install,
            CliCommand::Uninstall => Self::Uninstall,
        }
    }
}

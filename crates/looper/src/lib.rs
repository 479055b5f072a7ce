//! Runtime for the `looper` background audio utility.
//!
//! `looper` keeps at most one instance alive per machine. The binary parses a
//! single lifecycle verb, loads layered configuration, checks the host
//! platform and hands the verb to the [`lifecycle`] dispatcher. IO streams
//! and collaborators are injectable so tests can drive every path without
//! touching real processes or audio devices.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use looper_config::{APP_ID, Config};
use tracing::info;

pub mod autostart;
mod cli;
mod config;
mod errors;
pub mod lifecycle;
pub mod platform;
pub mod playback;
pub mod telemetry;

use cli::Cli;
use config::{ConfigLoader, OrthoConfigLoader, command_arguments, split_config_arguments};
use errors::AppError;
use lifecycle::{LifecycleCommand, LifecycleError, LifecycleOutput, SystemLifecycle};
use platform::{PlatformGate, SystemPlatformGate};

const CLI_TARGET: &str = "looper::cli";

/// Bundles the IO streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
    }
}

struct CliRunner<'a, W: Write, E: Write, L: ConfigLoader> {
    io: &'a mut IoStreams<'a, W, E>,
    loader: &'a L,
}

impl<'a, W, E, L> CliRunner<'a, W, E, L>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    fn new(io: &'a mut IoStreams<'a, W, E>, loader: &'a L) -> Self {
        Self { io, loader }
    }

    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        self.run_with_handler(args, |command, config, output| {
            SystemPlatformGate.check()?;
            SystemLifecycle::from_config(config)?.handle(command, output)
        })
    }

    fn run_with_handler<I, F>(&mut self, args: I, mut handler: F) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
        F: FnMut(
            LifecycleCommand,
            &Config,
            &mut LifecycleOutput<&mut W>,
        ) -> Result<ExitCode, LifecycleError>,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        let split = split_config_arguments(&args);

        let result = Cli::try_parse_from(command_arguments(&args, &split))
            .map_err(AppError::CliUsage)
            .and_then(|cli| {
                self.loader
                    .load(&split.config_arguments)
                    .map(|config| (cli, config))
            })
            .and_then(|(cli, config)| {
                telemetry::initialise(&config)?;
                let command = LifecycleCommand::from(cli.command);
                info!(
                    target: CLI_TARGET,
                    version = env!("CARGO_PKG_VERSION"),
                    %command,
                    "{APP_ID} v{}",
                    env!("CARGO_PKG_VERSION")
                );
                let mut output = LifecycleOutput::new(&mut *self.io.stdout);
                handler(command, &config, &mut output).map_err(AppError::from)
            });

        match result {
            Ok(exit_code) => exit_code,
            Err(error) => {
                let _ = writeln!(self.io.stderr, "{error}");
                ExitCode::FAILURE
            }
        }
    }
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdout, stderr);
    CliRunner::new(&mut io, &OrthoConfigLoader).run(args)
}

#[cfg(test)]
mod tests;

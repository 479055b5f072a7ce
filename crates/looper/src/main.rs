//! CLI entrypoint for `looper`.
//!
//! Delegates to [`looper::run`]. The standard streams are passed unlocked:
//! `start` blocks for the lifetime of the instance while the signal listener
//! thread still needs to log.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    looper::run(std::env::args_os(), &mut io::stdout(), &mut io::stderr())
}

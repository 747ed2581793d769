//! Entry point for the `pgrecipe` binary.
//!
//! Delegates to [`pgrecipe::run`], which loads configuration, parses the
//! subcommand and drives the lifecycle controller or one of the proxies.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    pgrecipe::run(std::env::args_os(), &mut stdout, &mut stderr)
}

//! PostgreSQL lifecycle manager for build trees.
//!
//! `pgrecipe` creates a database cluster with `pg_ctl initdb`, starts it, runs
//! a list of post-initialisation commands, and stops it again. It also exposes
//! `psql` and `pg_ctl` through argument proxies that fill in the configured
//! connection defaults.
//!
//! The library is organised as:
//! - [`process`]: the [`process::ProcessRunner`] seam over child processes.
//! - [`proxy`]: argument rewriting for `psql` and `pg_ctl`.
//! - [`recipe`]: the install and update state machine.
//! - [`telemetry`]: structured logging setup.
//!
//! [`run`] ties them together for the binary.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use tracing::debug;

mod cli;
mod config;
mod errors;
mod output;
pub mod process;
pub mod proxy;
pub mod recipe;
pub mod telemetry;

use cli::{Cli, CliCommand};
use config::{
    ConfigArgumentSplit, ConfigLoader, OrthoConfigLoader, command_arguments, split_config_arguments,
};
pub(crate) use errors::AppError;
use output::CommandOutput;
use process::{ExitOutcome, ProcessRunner, SystemRunner};
use proxy::{pg_ctl, psql};
use recipe::{Recipe, RecipeOutcome};

const CLI_TARGET: &str = "pgrecipe::cli";

/// Runs the binary with the given arguments and output streams.
///
/// Configuration is layered from defaults, the configuration file,
/// `PGRECIPE_*` environment variables and the leading configuration flags.
/// Errors are written to `stderr` and reported as [`ExitCode::FAILURE`];
/// the proxy commands mirror the exit code of the tool they run.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdout, stderr, &OrthoConfigLoader, &SystemRunner)
}

/// Runs the binary with a custom configuration loader and process runner.
pub(crate) fn run_with_loader<I, W, E, L, R>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
    runner: &R,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
    R: ProcessRunner,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);
    let mut output = CommandOutput::new(stdout, stderr);

    let cli = match Cli::try_parse_from(command_arguments(&args, &split)) {
        Ok(cli) => cli,
        Err(error) => return report_usage(&error, &mut output),
    };

    match execute(cli.command, &split, loader, runner, &mut output) {
        Ok(exit_code) => exit_code,
        Err(error) => {
            let _ = output.stderr_line(format_args!("{error}"));
            ExitCode::FAILURE
        }
    }
}

fn report_usage<W: Write, E: Write>(
    error: &clap::Error,
    output: &mut CommandOutput<W, E>,
) -> ExitCode {
    let rendered = error.render().to_string();
    let rendered = rendered.trim_end();
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = output.stdout_line(format_args!("{rendered}"));
            ExitCode::SUCCESS
        }
        _ => {
            let _ = output.stderr_line(format_args!("{rendered}"));
            ExitCode::FAILURE
        }
    }
}

fn execute<W, E, L, R>(
    command: CliCommand,
    split: &ConfigArgumentSplit,
    loader: &L,
    runner: &R,
    output: &mut CommandOutput<W, E>,
) -> Result<ExitCode, AppError>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
    R: ProcessRunner,
{
    let config = loader.load(&split.config_arguments)?;
    telemetry::initialise(&config)?;
    let settings = config.settings()?;
    debug!(target: CLI_TARGET, ?command, pgdata = %settings.pgdata(), "dispatching command");

    let recipe = Recipe::new(settings, runner);
    match command {
        CliCommand::Install => report_outcome(&recipe.install()?, output),
        CliCommand::Update => report_outcome(&recipe.update()?, output),
        CliCommand::Start => {
            recipe.start()?;
            Ok(ExitCode::SUCCESS)
        }
        CliCommand::Stop => {
            recipe.stop()?;
            Ok(ExitCode::SUCCESS)
        }
        CliCommand::Status => {
            let status = recipe.status()?;
            output.stdout_line(format_args!("{status}"))?;
            Ok(ExitCode::SUCCESS)
        }
        CliCommand::Psql { arguments } => {
            let outcome = psql(runner, recipe.settings(), &arguments)?;
            Ok(exit_code_from_outcome(outcome))
        }
        CliCommand::PgCtl { arguments } => {
            let outcome = pg_ctl(runner, recipe.settings(), &arguments)?;
            Ok(exit_code_from_outcome(outcome))
        }
    }
}

/// Prints the location, then any post-init failures.
fn report_outcome<W: Write, E: Write>(
    outcome: &RecipeOutcome,
    output: &mut CommandOutput<W, E>,
) -> Result<ExitCode, AppError> {
    output.stdout_line(format_args!("{}", outcome.location()))?;
    let report = outcome.report();
    for failure in report.failures() {
        output.stderr_line(format_args!("post-init command {failure}"))?;
    }
    if report.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn exit_code_from_outcome(outcome: ExitOutcome) -> ExitCode {
    outcome
        .code()
        .and_then(|code| u8::try_from(code).ok())
        .map_or(ExitCode::FAILURE, ExitCode::from)
}

#[cfg(test)]
mod tests;

//! Proxy for the interactive query tool.

use camino::Utf8PathBuf;
use pgrecipe_config::RecipeSettings;
use tracing::debug;

use super::ProxyError;
use super::flags::{FlagSpec, Token, scan};
use crate::process::{ExitOutcome, Invocation, ProcessRunner};

const PROXY_TARGET: &str = "pgrecipe::proxy::psql";

#[derive(Debug, Clone, Copy)]
enum PsqlFlag {
    BinDir,
    Dbname,
    Username,
    Port,
}

const PSQL_FLAGS: &[FlagSpec<PsqlFlag>] = &[
    FlagSpec::new(PsqlFlag::BinDir, None, Some("bin_dir")),
    FlagSpec::new(PsqlFlag::Dbname, Some('d'), Some("dbname")),
    FlagSpec::new(PsqlFlag::Username, Some('U'), Some("username")),
    FlagSpec::new(PsqlFlag::Port, Some('p'), Some("port")),
];

/// Builds the `psql` command line for `arguments`.
///
/// `--bin_dir`, `-d/--dbname`, `-U/--username` and `-p/--port` override the
/// configured defaults; every other token is appended verbatim after the
/// connection options.
///
/// # Errors
///
/// Returns [`ProxyError::MissingValue`] when a recognised flag lacks a value.
pub fn psql_invocation(
    settings: &RecipeSettings,
    arguments: &[String],
) -> Result<Invocation, ProxyError> {
    let mut bin_dir = settings.bin_dir().to_path_buf();
    let mut dbname = settings.dbname().to_owned();
    let mut username = settings.user().to_owned();
    let mut port = settings.port().to_string();
    let mut extras = Vec::new();

    for token in scan(arguments, PSQL_FLAGS)? {
        match token {
            Token::Flag { key, value: Some(value) } => match key {
                PsqlFlag::BinDir => bin_dir = Utf8PathBuf::from(value),
                PsqlFlag::Dbname => dbname = value,
                PsqlFlag::Username => username = value,
                PsqlFlag::Port => port = value,
            },
            Token::Flag { value: None, .. } => {}
            Token::Positional(extra) | Token::Passthrough(extra) => extras.push(extra),
        }
    }

    Ok(Invocation::new(bin_dir.join("psql"))
        .args(["--dbname", dbname.as_str()])
        .args(["--username", username.as_str()])
        .args(["--port", port.as_str()])
        .args(extras))
}

/// Runs `psql` with `arguments`, blocking until it exits.
///
/// The exit outcome is returned as-is; a failing query is not an error.
///
/// # Errors
///
/// Returns [`ProxyError`] for malformed arguments or when `psql` cannot be
/// launched.
pub fn psql<R: ProcessRunner>(
    runner: &R,
    settings: &RecipeSettings,
    arguments: &[String],
) -> Result<ExitOutcome, ProxyError> {
    let invocation = psql_invocation(settings, arguments)?;
    debug!(target: PROXY_TARGET, command = %invocation, "proxying psql");
    Ok(runner.run(&invocation)?)
}

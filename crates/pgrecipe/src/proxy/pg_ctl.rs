//! Proxy for the server control tool.

use std::fmt;

use camino::Utf8PathBuf;
use pgrecipe_config::RecipeSettings;
use tracing::debug;

use super::ProxyError;
use super::flags::{FlagSpec, Token, scan};
use crate::process::{ExitOutcome, Invocation, ProcessRunner};

const PROXY_TARGET: &str = "pgrecipe::proxy::pg_ctl";

/// `pg_ctl` commands issued by the lifecycle controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Create a new cluster in the data directory.
    Initdb,
    /// Start the server.
    Start,
    /// Stop the server.
    Stop,
    /// Stop and start the server.
    Restart,
}

impl ControlCommand {
    /// Token understood by `pg_ctl`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initdb => "initdb",
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
        }
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
enum ControlFlag {
    BinDir,
    Pgdata,
    Options,
}

const CONTROL_FLAGS: &[FlagSpec<ControlFlag>] = &[
    FlagSpec::new(ControlFlag::BinDir, None, Some("bin_dir")),
    FlagSpec::new(ControlFlag::Pgdata, Some('D'), Some("pgdata")),
    FlagSpec::new(ControlFlag::Options, Some('o'), None).optional_value(),
];

/// Builds the `pg_ctl` command line for `arguments`.
///
/// The first bare token is the positional command. `--bin_dir` and
/// `-D/--pgdata` override the configured defaults and `-o` carries options
/// for the server or `initdb`. The result is ordered as
/// `<bin>/pg_ctl [-o <options>] -D <pgdata> <command> <extras...>`.
///
/// # Errors
///
/// Returns [`ProxyError::MissingCommand`] when no positional command is
/// present and [`ProxyError::MissingValue`] when a recognised flag lacks a
/// value.
pub fn pg_ctl_invocation(
    settings: &RecipeSettings,
    arguments: &[String],
) -> Result<Invocation, ProxyError> {
    let mut bin_dir = settings.bin_dir().to_path_buf();
    let mut pgdata = settings.pgdata().to_string();
    let mut options = None;
    let mut command = None;
    let mut extras = Vec::new();

    for token in scan(arguments, CONTROL_FLAGS)? {
        match token {
            Token::Flag {
                key: ControlFlag::BinDir,
                value: Some(value),
            } => bin_dir = Utf8PathBuf::from(value),
            Token::Flag {
                key: ControlFlag::Pgdata,
                value: Some(value),
            } => pgdata = value,
            Token::Flag {
                key: ControlFlag::Options,
                value,
            } => options = value.filter(|text| !text.is_empty()),
            Token::Flag { value: None, .. } => {}
            Token::Positional(word) if command.is_none() => command = Some(word),
            Token::Positional(extra) | Token::Passthrough(extra) => extras.push(extra),
        }
    }

    let command = command.ok_or(ProxyError::MissingCommand)?;
    let mut invocation = Invocation::new(bin_dir.join("pg_ctl"));
    if let Some(options) = options {
        invocation = invocation.args(["-o".to_owned(), options]);
    }
    Ok(invocation
        .args(["-D".to_owned(), pgdata, command])
        .args(extras))
}

/// Runs `pg_ctl` with `arguments`, blocking until it exits.
///
/// # Errors
///
/// Returns [`ProxyError`] for malformed arguments or when `pg_ctl` cannot be
/// launched. A non-zero exit is returned as an [`ExitOutcome`].
pub fn pg_ctl<R: ProcessRunner>(
    runner: &R,
    settings: &RecipeSettings,
    arguments: &[String],
) -> Result<ExitOutcome, ProxyError> {
    let invocation = pg_ctl_invocation(settings, arguments)?;
    debug!(target: PROXY_TARGET, command = %invocation, "proxying pg_ctl");
    Ok(runner.run(&invocation)?)
}

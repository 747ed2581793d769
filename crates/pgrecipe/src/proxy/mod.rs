//! Argument proxies for the PostgreSQL client and control tools.
//!
//! Each proxy takes the configured defaults plus an explicit argument list,
//! extracts the handful of options it understands, and builds the command
//! line expected by the wrapped executable. Anything it does not recognise is
//! forwarded verbatim. Proxies never inspect process-wide state such as
//! `std::env::args`.
//!
//! - [`psql`] builds `<bin>/psql --dbname <db> --username <user> --port <port> ...`.
//! - [`pg_ctl`] builds `<bin>/pg_ctl [-o <options>] -D <pgdata> <command> ...`.

mod flags;
mod pg_ctl;
mod psql;

use thiserror::Error;

use crate::process::RunError;

pub use pg_ctl::{ControlCommand, pg_ctl, pg_ctl_invocation};
pub use psql::{psql, psql_invocation};

/// Errors raised by the argument proxies.
///
/// A non-zero exit of the wrapped tool is never an error; it is returned as
/// an [`ExitOutcome`](crate::process::ExitOutcome) for the caller to judge.
#[derive(Debug, Clone, Error)]
pub enum ProxyError {
    /// A recognised flag was given without its required value.
    #[error("option '{flag}' expects a value")]
    MissingValue {
        /// Flag as typed by the caller.
        flag: String,
    },
    /// The control tool was invoked without its positional command.
    #[error("a pg_ctl command is required (for example start, stop, restart, initdb)")]
    MissingCommand,
    /// The wrapped executable could not be launched.
    #[error(transparent)]
    Run(#[from] RunError),
}

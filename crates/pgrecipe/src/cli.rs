//! Command-line interface definitions for `pgrecipe`.
//!
//! Configuration flags (`--bin`, `--pgdata`, `--port`, ...) are stripped
//! before this parser runs and handed to the configuration loader instead, so
//! the structures here only describe the subcommand and its arguments.

use clap::{Parser, Subcommand};

/// Manages a local PostgreSQL instance for a build tree.
#[derive(Parser, Debug)]
#[command(
    name = "pgrecipe",
    version,
    disable_help_subcommand = true,
    after_help = "Configuration flags such as --bin and --pgdata must precede the command."
)]
pub(crate) struct Cli {
    /// Operation to perform.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Operations exposed by the binary.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum CliCommand {
    /// Creates the location, initialises the cluster and runs post-init commands.
    Install,
    /// Re-runs the post-init commands, initialising the cluster if missing.
    Update,
    /// Starts the server, or restarts it when already running.
    Start,
    /// Stops the server when running.
    Stop,
    /// Reports whether the cluster exists and the server is running.
    Status,
    /// Runs `psql` against the configured instance.
    Psql {
        /// Arguments forwarded to the proxy.
        #[arg(
            value_name = "ARG",
            num_args = 0..,
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        arguments: Vec<String>,
    },
    /// Runs `pg_ctl` against the configured data directory.
    #[command(name = "pg-ctl")]
    PgCtl {
        /// Arguments forwarded to the proxy; the first positional is the
        /// `pg_ctl` command.
        #[arg(
            value_name = "ARG",
            num_args = 0..,
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        arguments: Vec<String>,
    },
}

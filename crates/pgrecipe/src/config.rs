//! Configuration loading helpers for the `pgrecipe` binary.
//!
//! Leading configuration flags are peeled off the argument list and handed to
//! `ortho_config`; the remaining tokens are parsed as the subcommand.

use std::ffi::{OsStr, OsString};

use ortho_config::OrthoConfig;
use pgrecipe_config::Config;

use crate::AppError;

/// Flags recognised by the configuration loader.
///
/// MAINTENANCE: keep in sync with the fields of `pgrecipe_config::Config`.
const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--bin",
    "--pgdata",
    "--port",
    "--user",
    "--dbname",
    "--initdb",
    "--cmds",
    "--name",
    "--parts-directory",
    "--log-filter",
    "--log-format",
    "--readiness",
    "--readiness-delay-ms",
    "--readiness-attempts",
    "--readiness-interval-ms",
];

/// Source of the layered configuration.
pub(crate) trait ConfigLoader {
    /// Loads configuration from the given configuration arguments.
    ///
    /// Configuration flags must appear before the subcommand; anything after
    /// it belongs to the subcommand.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

/// Loader backed by `ortho_config` (defaults, file, environment, flags).
pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Stop,
}

fn classify(argument: &OsStr) -> FlagAction {
    let text = argument.to_string_lossy();
    if !text.starts_with("--") {
        return FlagAction::Stop;
    }
    let (flag, inline_value) = match text.split_once('=') {
        Some((flag, _)) => (flag, true),
        None => (text.as_ref(), false),
    };
    if CONFIG_CLI_FLAGS.contains(&flag) {
        FlagAction::Include {
            needs_value: !inline_value,
        }
    } else {
        FlagAction::Stop
    }
}

/// Arguments destined for the configuration loader and where the subcommand
/// begins.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ConfigArgumentSplit {
    pub(crate) config_arguments: Vec<OsString>,
    pub(crate) command_start: usize,
}

/// Splits leading configuration flags (and their values) from the rest.
///
/// The program name is kept as the first configuration argument.
pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let Some(program) = args.first() else {
        return ConfigArgumentSplit {
            config_arguments: Vec::new(),
            command_start: 0,
        };
    };

    let mut config_arguments = vec![program.clone()];
    let mut index = 1;
    while let Some(argument) = args.get(index) {
        match classify(argument) {
            FlagAction::Include { needs_value } => {
                config_arguments.push(argument.clone());
                index += 1;
                if needs_value && let Some(value) = args.get(index) {
                    config_arguments.push(value.clone());
                    index += 1;
                }
            }
            FlagAction::Stop => break,
        }
    }

    ConfigArgumentSplit {
        config_arguments,
        command_start: index,
    }
}

/// Program name followed by everything from the subcommand onwards.
pub(crate) fn command_arguments(args: &[OsString], split: &ConfigArgumentSplit) -> Vec<OsString> {
    args.first()
        .into_iter()
        .chain(args.iter().skip(split.command_start.max(1)))
        .cloned()
        .collect()
}

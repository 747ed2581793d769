//! Validated recipe settings derived from the loaded configuration.
//!
//! The raw [`Config`] mirrors what operators type into files, environment
//! variables and flags. [`RecipeSettings`] is the checked form consumed by the
//! lifecycle controller: required keys are present, paths are typed, and the
//! instance location has been derived as `<parts-directory>/<name>`.

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

use crate::readiness::{ReadinessMode, ReadinessPolicy};
use crate::Config;

/// File written by the postmaster while the server is running.
pub const PID_FILE_NAME: &str = "postmaster.pid";

/// Checked settings for a single PostgreSQL instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeSettings {
    name: String,
    location: Utf8PathBuf,
    bin_dir: Utf8PathBuf,
    pgdata: Utf8PathBuf,
    port: u16,
    user: String,
    dbname: String,
    initdb: Option<String>,
    cmds: Option<String>,
    readiness: ReadinessPolicy,
}

impl RecipeSettings {
    /// Validates the configuration and derives the instance location.
    pub fn from_config(config: &Config) -> Result<Self, SettingsError> {
        let name = required("name", Some(config.name.as_str()))?;
        let parts_directory = required("parts_directory", Some(config.parts_directory.as_str()))?;
        let bin_dir = required("bin", config.bin.as_deref())?;
        let pgdata = required("pgdata", config.pgdata.as_deref())?;
        if config.port == 0 {
            return Err(SettingsError::InvalidPort);
        }
        let readiness = readiness_policy(config)?;
        Ok(Self {
            location: Utf8PathBuf::from(parts_directory).join(name),
            name: name.to_owned(),
            bin_dir: Utf8PathBuf::from(bin_dir),
            pgdata: Utf8PathBuf::from(pgdata),
            port: config.port,
            user: config.user.clone(),
            dbname: config.dbname.clone(),
            initdb: non_blank(config.initdb.as_deref()),
            cmds: non_blank(config.cmds.as_deref()),
            readiness,
        })
    }

    /// Returns a copy with a different readiness policy.
    #[must_use]
    pub fn with_readiness(mut self, readiness: ReadinessPolicy) -> Self {
        self.readiness = readiness;
        self
    }

    /// Instance name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory owned by the recipe, `<parts-directory>/<name>`.
    pub fn location(&self) -> &Utf8Path {
        &self.location
    }

    /// Alias of [`Self::location`].
    pub fn prefix(&self) -> &Utf8Path {
        &self.location
    }

    /// Directory holding `pg_ctl`, `psql` and the post-init executables.
    pub fn bin_dir(&self) -> &Utf8Path {
        &self.bin_dir
    }

    /// Data directory of the cluster.
    pub fn pgdata(&self) -> &Utf8Path {
        &self.pgdata
    }

    /// Process-id file inside the data directory.
    pub fn pid_file(&self) -> Utf8PathBuf {
        self.pgdata.join(PID_FILE_NAME)
    }

    /// Server port.
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Database user passed to `psql`.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Database name passed to `psql`.
    pub fn dbname(&self) -> &str {
        &self.dbname
    }

    /// Raw initialisation argument string, if configured.
    pub fn initdb(&self) -> Option<&str> {
        self.initdb.as_deref()
    }

    /// Initialisation arguments split on whitespace.
    pub fn initdb_arguments(&self) -> Vec<String> {
        self.initdb
            .as_deref()
            .map(|raw| raw.split_whitespace().map(str::to_owned).collect())
            .unwrap_or_default()
    }

    /// Raw newline-separated post-init command list, if configured.
    pub fn cmds(&self) -> Option<&str> {
        self.cmds.as_deref()
    }

    /// Readiness policy applied after start and stop.
    pub const fn readiness(&self) -> ReadinessPolicy {
        self.readiness
    }
}

fn required<'a>(key: &'static str, value: Option<&'a str>) -> Result<&'a str, SettingsError> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(SettingsError::Missing { key }),
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .filter(|text| !text.trim().is_empty())
        .map(str::to_owned)
}

fn readiness_policy(config: &Config) -> Result<ReadinessPolicy, SettingsError> {
    match config.readiness {
        ReadinessMode::Fixed => Ok(ReadinessPolicy::FixedDelay(Duration::from_millis(
            config.readiness_delay_ms,
        ))),
        ReadinessMode::Poll if config.readiness_attempts == 0 => {
            Err(SettingsError::InvalidReadinessAttempts)
        }
        ReadinessMode::Poll => Ok(ReadinessPolicy::Poll {
            attempts: config.readiness_attempts,
            interval: Duration::from_millis(config.readiness_interval_ms),
        }),
    }
}

/// Errors raised while validating recipe settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    /// A required option was absent or blank.
    #[error("missing required option '{key}'")]
    Missing { key: &'static str },
    /// The configured port was zero.
    #[error("port must be between 1 and 65535")]
    InvalidPort,
    /// Polling readiness was selected with no attempts.
    #[error("readiness_attempts must be at least 1 when readiness is 'poll'")]
    InvalidReadinessAttempts,
}

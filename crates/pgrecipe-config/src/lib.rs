//! Shared configuration for the `pgrecipe` PostgreSQL lifecycle manager.
//!
//! Options are layered by `ortho_config`: built-in defaults, then an optional
//! TOML file (`--config-path` or `PGRECIPE_CONFIG_PATH`), then `PGRECIPE_*`
//! environment variables, then command-line flags. The loaded [`Config`] is a
//! faithful copy of what the operator supplied; [`RecipeSettings`] is the
//! validated view used by the lifecycle controller.

mod defaults;
mod logging;
mod readiness;
mod settings;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_DBNAME, DEFAULT_LOG_FILTER, DEFAULT_NAME, DEFAULT_PARTS_DIRECTORY, DEFAULT_PORT,
    DEFAULT_READINESS_ATTEMPTS, DEFAULT_READINESS_DELAY_MS, DEFAULT_READINESS_INTERVAL_MS,
    DEFAULT_USER, default_dbname, default_log_filter, default_log_filter_string,
    default_log_format, default_name, default_parts_directory, default_readiness_mode,
    default_user,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use readiness::{ReadinessMode, ReadinessPolicy};
pub use settings::{PID_FILE_NAME, RecipeSettings, SettingsError};

/// Operator-facing configuration for one PostgreSQL instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "PGRECIPE")]
pub struct Config {
    /// Directory containing the PostgreSQL executables (`pg_ctl`, `psql`).
    pub bin: Option<String>,
    /// Data directory of the cluster.
    pub pgdata: Option<String>,
    /// Port the server listens on.
    #[ortho_config(default = DEFAULT_PORT)]
    pub port: u16,
    /// Database user passed to `psql`.
    #[ortho_config(default = default_user())]
    pub user: String,
    /// Database name passed to `psql`.
    #[ortho_config(default = default_dbname())]
    pub dbname: String,
    /// Whitespace-separated arguments forwarded to `pg_ctl initdb`.
    pub initdb: Option<String>,
    /// Newline-separated commands run from `bin` after initialisation.
    pub cmds: Option<String>,
    /// Instance name, the last component of the recipe location.
    #[ortho_config(default = default_name())]
    pub name: String,
    /// Directory under which the instance location is created.
    #[ortho_config(default = default_parts_directory())]
    pub parts_directory: String,
    /// `tracing` filter expression.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Log output format.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Readiness strategy applied after start and stop.
    #[ortho_config(default = default_readiness_mode())]
    pub readiness: ReadinessMode,
    /// Fixed pause in milliseconds for the `fixed` readiness mode.
    #[ortho_config(default = DEFAULT_READINESS_DELAY_MS)]
    pub readiness_delay_ms: u64,
    /// Check count for the `poll` readiness mode.
    #[ortho_config(default = DEFAULT_READINESS_ATTEMPTS)]
    pub readiness_attempts: u32,
    /// Pause in milliseconds between checks for the `poll` readiness mode.
    #[ortho_config(default = DEFAULT_READINESS_INTERVAL_MS)]
    pub readiness_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bin: None,
            pgdata: None,
            port: DEFAULT_PORT,
            user: default_user(),
            dbname: default_dbname(),
            initdb: None,
            cmds: None,
            name: default_name(),
            parts_directory: default_parts_directory(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            readiness: default_readiness_mode(),
            readiness_delay_ms: DEFAULT_READINESS_DELAY_MS,
            readiness_attempts: DEFAULT_READINESS_ATTEMPTS,
            readiness_interval_ms: DEFAULT_READINESS_INTERVAL_MS,
        }
    }
}

impl Config {
    /// `tracing` filter expression.
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Validates the configuration into [`RecipeSettings`].
    pub fn settings(&self) -> Result<RecipeSettings, SettingsError> {
        RecipeSettings::from_config(self)
    }
}

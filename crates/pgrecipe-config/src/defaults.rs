use crate::logging::LogFormat;
use crate::readiness::ReadinessMode;

/// Default port the PostgreSQL server listens on.
pub const DEFAULT_PORT: u16 = 5432;

/// Default superuser name passed to `psql`.
pub const DEFAULT_USER: &str = "postgres";

/// Default database name passed to `psql`.
pub const DEFAULT_DBNAME: &str = "postgres";

/// Default instance name; the last component of the recipe location.
pub const DEFAULT_NAME: &str = "postgres";

/// Default directory under which instance locations are created.
pub const DEFAULT_PARTS_DIRECTORY: &str = "parts";

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Fixed pause, in milliseconds, applied after starting or stopping the server.
pub const DEFAULT_READINESS_DELAY_MS: u64 = 4_000;

/// Number of checks made by the polling readiness policy.
pub const DEFAULT_READINESS_ATTEMPTS: u32 = 20;

/// Pause, in milliseconds, between readiness checks.
pub const DEFAULT_READINESS_INTERVAL_MS: u64 = 500;

/// Owned default superuser name.
pub fn default_user() -> String {
    DEFAULT_USER.to_owned()
}

/// Owned default database name.
pub fn default_dbname() -> String {
    DEFAULT_DBNAME.to_owned()
}

/// Owned default instance name.
pub fn default_name() -> String {
    DEFAULT_NAME.to_owned()
}

/// Owned default parts directory.
pub fn default_parts_directory() -> String {
    DEFAULT_PARTS_DIRECTORY.to_owned()
}

/// Default log filter expression used by the binary.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binary.
pub fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Default readiness strategy: the fixed post-start pause.
pub fn default_readiness_mode() -> ReadinessMode {
    ReadinessMode::Fixed
}

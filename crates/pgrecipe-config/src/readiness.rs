//! Readiness strategies applied after the server is started or stopped.
//!
//! `pg_ctl` returns before the postmaster is necessarily accepting
//! connections. The historical behaviour is a fixed four second pause; the
//! polling variant checks for the process-id file and a trivial query instead.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::defaults::DEFAULT_READINESS_DELAY_MS;

/// Readiness strategy selected in configuration.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ReadinessMode {
    /// Sleep for a fixed delay after each start or stop.
    #[default]
    Fixed,
    /// Check with bounded retries until the server reports ready.
    Poll,
}

/// Resolved readiness policy consumed by the recipe controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessPolicy {
    /// Sleep unconditionally for the given duration.
    FixedDelay(Duration),
    /// Check up to `attempts` times, sleeping `interval` between checks.
    Poll {
        /// Maximum number of checks.
        attempts: u32,
        /// Pause between consecutive checks.
        interval: Duration,
    },
}

impl ReadinessPolicy {
    /// Pause used by the historical fixed-delay behaviour.
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(DEFAULT_READINESS_DELAY_MS);

    /// Policy that never waits. Useful for tests and scripted environments.
    pub const fn immediate() -> Self {
        Self::FixedDelay(Duration::ZERO)
    }
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self::FixedDelay(Self::DEFAULT_DELAY)
    }
}

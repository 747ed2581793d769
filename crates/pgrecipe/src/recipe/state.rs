//! Recipe state machine labels and instance status.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};

use super::commands::CommandReport;

/// Stages an install or update passes through.
///
/// `install` on a pre-provisioned data directory moves straight from
/// [`RecipeState::Uninitialized`] to [`RecipeState::Stopped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeState {
    /// Nothing has been done yet.
    Uninitialized,
    /// The cluster is being created.
    Initializing,
    /// The server has been started.
    Started,
    /// Post-init commands are running.
    RunningCommands,
    /// The server has been stopped; the flow is complete.
    Stopped,
}

impl fmt::Display for RecipeState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Started => "started",
            Self::RunningCommands => "running_cmds",
            Self::Stopped => "stopped",
        })
    }
}

/// Result of a completed install or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeOutcome {
    pub(crate) location: Utf8PathBuf,
    pub(crate) report: CommandReport,
    pub(crate) states: Vec<RecipeState>,
}

impl RecipeOutcome {
    /// Instance location, `<parts-directory>/<name>`.
    #[must_use]
    pub fn location(&self) -> &Utf8Path {
        &self.location
    }

    /// Outcome of the post-init commands; empty when none ran.
    #[must_use]
    pub const fn report(&self) -> &CommandReport {
        &self.report
    }

    /// States visited, in order.
    #[must_use]
    pub fn states(&self) -> &[RecipeState] {
        &self.states
    }
}

/// Snapshot of the on-disk markers for an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceStatus {
    /// The data directory exists.
    pub initialized: bool,
    /// `postmaster.pid` exists inside the data directory.
    pub pid_file_present: bool,
    /// `pg_ctl` exists in the binary directory.
    pub control_tool_present: bool,
}

impl InstanceStatus {
    /// Whether the server is considered running.
    #[must_use]
    pub const fn is_running(self) -> bool {
        self.control_tool_present && self.pid_file_present
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cluster = if self.initialized {
            "initialized"
        } else {
            "not initialized"
        };
        let server = if self.is_running() {
            "running"
        } else {
            "stopped"
        };
        write!(formatter, "cluster {cluster}, server {server}")?;
        if !self.control_tool_present {
            formatter.write_str(" (pg_ctl not found)")?;
        }
        Ok(())
    }
}

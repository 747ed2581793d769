//! Lifecycle controller for a local PostgreSQL instance.
//!
//! The controller keeps no state of its own. Two filesystem markers drive
//! every decision:
//!
//! - the data directory exists: the cluster has been initialised;
//! - `postmaster.pid` exists inside it: the server is running.
//!
//! Install and update walk `uninitialized → initializing → started →
//! running_cmds → stopped`, issuing `pg_ctl` and post-init commands through a
//! [`ProcessRunner`]. Every child process blocks the caller until it exits.
//! The markers are not locked, so two flows must not target the same data
//! directory concurrently.
//!
//! The module is split so each concern stays small:
//! - [`commands`] parses the post-init list and collects its report.
//! - [`readiness`] applies the configured wait after start and stop.
//! - [`state`] names the stages and the values returned to callers.
//! - [`error`] defines [`RecipeError`].

mod commands;
mod error;
mod readiness;
mod state;

use std::fs;
use std::sync::Arc;

use camino::Utf8Path;
use pgrecipe_config::RecipeSettings;
use tracing::{debug, info, warn};

use crate::process::{ExitOutcome, ProcessRunner};
use crate::proxy::{ControlCommand, pg_ctl};

pub use commands::{CommandFailure, CommandReport, FailureStatus, PostInitCommand, parse_commands};
pub use error::RecipeError;
pub use state::{InstanceStatus, RecipeOutcome, RecipeState};

const RECIPE_TARGET: &str = "pgrecipe::recipe";

/// Installs, updates, starts and stops one PostgreSQL instance.
#[derive(Debug)]
pub struct Recipe<R> {
    settings: RecipeSettings,
    runner: R,
}

impl<R> Recipe<R> {
    /// Creates a controller for `settings` that runs commands through `runner`.
    pub const fn new(settings: RecipeSettings, runner: R) -> Self {
        Self { settings, runner }
    }

    /// Settings the controller was built with.
    pub const fn settings(&self) -> &RecipeSettings {
        &self.settings
    }

    /// Runner used for child processes.
    pub const fn runner(&self) -> &R {
        &self.runner
    }
}

impl<R: ProcessRunner> Recipe<R> {
    /// Provisions the instance.
    ///
    /// An existing data directory is treated as already provisioned: it is
    /// stopped if running and left alone. Otherwise the cluster is stopped
    /// (a no-op when not running), initialised, started, the post-init
    /// commands run, and the server is stopped again.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError`] when the location cannot be created, a marker
    /// cannot be inspected, initialisation fails, or a tool cannot be
    /// launched.
    pub fn install(&self) -> Result<RecipeOutcome, RecipeError> {
        info!(target: RECIPE_TARGET, instance = self.settings.name(), "installing instance");
        let mut flow = Flow::new();
        self.ensure_location()?;

        if self.pgdata_exists()? {
            info!(
                target: RECIPE_TARGET,
                pgdata = %self.settings.pgdata(),
                "data directory exists; leaving cluster untouched"
            );
            self.stop()?;
            flow.enter(RecipeState::Stopped);
            return Ok(flow.finish(self.settings.location(), CommandReport::default()));
        }

        self.stop()?;
        flow.enter(RecipeState::Initializing);
        self.initialize()?;
        let report = self.provision(&mut flow)?;
        Ok(flow.finish(self.settings.location(), report))
    }

    /// Brings an existing instance up to date.
    ///
    /// The server is always stopped first, the cluster is initialised only
    /// when the data directory is still missing, and the post-init commands
    /// are run against a freshly started server.
    ///
    /// # Errors
    ///
    /// See [`Recipe::install`].
    pub fn update(&self) -> Result<RecipeOutcome, RecipeError> {
        info!(target: RECIPE_TARGET, instance = self.settings.name(), "updating instance");
        let mut flow = Flow::new();
        self.stop()?;
        if !self.pgdata_exists()? {
            flow.enter(RecipeState::Initializing);
            self.initialize()?;
        }
        let report = self.provision(&mut flow)?;
        Ok(flow.finish(self.settings.location(), report))
    }

    /// Starts the server, or restarts it when a process-id file is present,
    /// then applies the readiness policy.
    ///
    /// A non-zero exit from `pg_ctl` is logged and otherwise ignored.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError`] when `pg_ctl` cannot be launched or a marker
    /// cannot be inspected.
    pub fn start(&self) -> Result<(), RecipeError> {
        let command = if self.is_running()? {
            ControlCommand::Restart
        } else {
            ControlCommand::Start
        };
        self.control(command, &[])?;
        readiness::wait_after_start(&self.runner, &self.settings)
    }

    /// Stops the server when a process-id file is present; a no-op otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError`] when `pg_ctl` cannot be launched or a marker
    /// cannot be inspected.
    pub fn stop(&self) -> Result<(), RecipeError> {
        if !self.is_running()? {
            debug!(target: RECIPE_TARGET, "server not running; nothing to stop");
            return Ok(());
        }
        self.control(ControlCommand::Stop, &[])?;
        readiness::wait_after_stop(&self.settings)
    }

    /// Creates the cluster with `pg_ctl initdb <initdb arguments>`.
    ///
    /// Runs only when initialisation arguments are configured and the data
    /// directory does not exist yet. Returns whether `initdb` was run.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::InitializeFailed`] when `initdb` exits
    /// unsuccessfully.
    pub fn initialize(&self) -> Result<bool, RecipeError> {
        if self.settings.initdb().is_none() {
            debug!(target: RECIPE_TARGET, "no initdb arguments configured; skipping");
            return Ok(false);
        }
        if self.pgdata_exists()? {
            return Ok(false);
        }
        let arguments = self.settings.initdb_arguments();
        let outcome = self.control(ControlCommand::Initdb, &arguments)?;
        if !outcome.success() {
            return Err(RecipeError::InitializeFailed {
                pgdata: self.settings.pgdata().to_path_buf(),
                outcome,
            });
        }
        Ok(true)
    }

    /// Runs each configured post-init command from the binary directory.
    ///
    /// A failing command is logged and recorded, and the remaining commands
    /// still run.
    pub fn run_commands(&self) -> CommandReport {
        let mut report = CommandReport::default();
        let Some(raw) = self.settings.cmds() else {
            return report;
        };

        for command in parse_commands(raw) {
            let invocation = command.invocation(self.settings.bin_dir());
            match self.runner.run(&invocation) {
                Ok(outcome) if outcome.success() => report.record_success(&command),
                Ok(outcome) => {
                    warn!(
                        target: RECIPE_TARGET,
                        command = command.line(),
                        %outcome,
                        "post-init command failed"
                    );
                    report.record_failure(&command, FailureStatus::Exited(outcome));
                }
                Err(error) => {
                    warn!(
                        target: RECIPE_TARGET,
                        command = command.line(),
                        %error,
                        "post-init command could not be started"
                    );
                    report.record_failure(
                        &command,
                        FailureStatus::SpawnFailed {
                            message: error.to_string(),
                        },
                    );
                }
            }
        }
        report
    }

    /// Reports the on-disk markers without running any process.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::Inspect`] when a marker cannot be inspected.
    pub fn status(&self) -> Result<InstanceStatus, RecipeError> {
        Ok(InstanceStatus {
            initialized: self.pgdata_exists()?,
            pid_file_present: self.is_running()?,
            control_tool_present: marker_exists(&self.settings.bin_dir().join("pg_ctl"))?,
        })
    }

    fn provision(&self, flow: &mut Flow) -> Result<CommandReport, RecipeError> {
        self.start()?;
        flow.enter(RecipeState::Started);
        flow.enter(RecipeState::RunningCommands);
        let report = self.run_commands();
        self.stop()?;
        flow.enter(RecipeState::Stopped);
        Ok(report)
    }

    fn control(
        &self,
        command: ControlCommand,
        extras: &[String],
    ) -> Result<ExitOutcome, RecipeError> {
        let mut arguments = Vec::with_capacity(extras.len() + 1);
        arguments.push(command.as_str().to_owned());
        arguments.extend_from_slice(extras);
        let outcome = pg_ctl(&self.runner, &self.settings, &arguments)?;
        if !outcome.success() {
            warn!(target: RECIPE_TARGET, %command, %outcome, "pg_ctl reported failure");
        }
        Ok(outcome)
    }

    fn ensure_location(&self) -> Result<(), RecipeError> {
        let location = self.settings.location();
        fs::create_dir_all(location).map_err(|source| RecipeError::CreateLocation {
            path: location.to_path_buf(),
            source: Arc::new(source),
        })
    }

    fn pgdata_exists(&self) -> Result<bool, RecipeError> {
        marker_exists(self.settings.pgdata())
    }

    fn is_running(&self) -> Result<bool, RecipeError> {
        marker_exists(&self.settings.pid_file())
    }
}

/// Checks whether `path` exists, surfacing permission errors.
pub(crate) fn marker_exists(path: &Utf8Path) -> Result<bool, RecipeError> {
    path.as_std_path()
        .try_exists()
        .map_err(|source| RecipeError::Inspect {
            path: path.to_path_buf(),
            source: Arc::new(source),
        })
}

/// Records and logs state transitions for one install or update.
struct Flow {
    states: Vec<RecipeState>,
}

impl Flow {
    fn new() -> Self {
        Self {
            states: vec![RecipeState::Uninitialized],
        }
    }

    fn enter(&mut self, state: RecipeState) {
        debug!(target: RECIPE_TARGET, %state, "recipe transition");
        self.states.push(state);
    }

    fn finish(self, location: &Utf8Path, report: CommandReport) -> RecipeOutcome {
        RecipeOutcome {
            location: location.to_path_buf(),
            report,
            states: self.states,
        }
    }
}

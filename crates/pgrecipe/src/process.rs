//! Synchronous execution of external PostgreSQL tools.
//!
//! Every interaction with the database engine is a blocking child process:
//! an [`Invocation`] names the executable and its argument tokens, and a
//! [`ProcessRunner`] executes it with inherited standard streams. The trait
//! exists so the lifecycle controller can be driven by recording doubles in
//! tests; [`SystemRunner`] is the production implementation.

use std::fmt;
use std::io;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use tracing::debug;

/// Tracing target for process execution.
const PROCESS_TARGET: &str = "pgrecipe::process";

/// A single external command line: executable path plus argument tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: Utf8PathBuf,
    arguments: Vec<String>,
}

impl Invocation {
    /// Creates an invocation of `program` with no arguments.
    pub fn new(program: impl Into<Utf8PathBuf>) -> Self {
        Self {
            program: program.into(),
            arguments: Vec::new(),
        }
    }

    /// Appends one argument token.
    #[must_use]
    pub fn arg(mut self, argument: impl Into<String>) -> Self {
        self.arguments.push(argument.into());
        self
    }

    /// Appends several argument tokens in order.
    #[must_use]
    pub fn args<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments.extend(arguments.into_iter().map(Into::into));
        self
    }

    /// Executable path.
    #[must_use]
    pub fn program(&self) -> &Utf8Path {
        &self.program
    }

    /// Argument tokens, excluding the executable.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Full command line as tokens, executable first.
    #[must_use]
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens = Vec::with_capacity(self.arguments.len() + 1);
        tokens.push(self.program.to_string());
        tokens.extend(self.arguments.iter().cloned());
        tokens
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.program.as_str())?;
        for argument in &self.arguments {
            write!(formatter, " {argument}")?;
        }
        Ok(())
    }
}

/// Exit status of a finished child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    code: Option<i32>,
}

impl ExitOutcome {
    /// Outcome of a process that exited with status zero.
    pub const SUCCESS: Self = Self { code: Some(0) };

    /// Outcome of a process that exited with `code`.
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    /// Outcome of a process terminated without an exit code (for example by a
    /// signal).
    #[must_use]
    pub const fn terminated() -> Self {
        Self { code: None }
    }

    /// Whether the process exited with status zero.
    #[must_use]
    pub const fn success(self) -> bool {
        matches!(self.code, Some(0))
    }

    /// Exit code, if the process exited normally.
    #[must_use]
    pub const fn code(self) -> Option<i32> {
        self.code
    }
}

impl From<ExitStatus> for ExitOutcome {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(formatter, "exit status {code}"),
            None => formatter.write_str("terminated by signal"),
        }
    }
}

/// Errors raised while launching a child process.
#[derive(Debug, Clone, Error)]
pub enum RunError {
    /// The executable could not be spawned.
    #[error("failed to run '{program}': {source}")]
    Spawn {
        /// Executable that failed to launch.
        program: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
}

/// Executes invocations synchronously.
pub trait ProcessRunner {
    /// Runs `invocation` to completion and returns its exit outcome.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Spawn`] when the executable cannot be launched. A
    /// non-zero exit is not an error at this layer.
    fn run(&self, invocation: &Invocation) -> Result<ExitOutcome, RunError>;
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &R {
    fn run(&self, invocation: &Invocation) -> Result<ExitOutcome, RunError> {
        (**self).run(invocation)
    }
}

/// Production runner that spawns real child processes.
///
/// Standard streams are inherited so the output of `pg_ctl`, `psql` and the
/// post-init commands reaches the operator unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<ExitOutcome, RunError> {
        debug!(target: PROCESS_TARGET, command = %invocation, "running command");
        let status = Command::new(invocation.program().as_std_path())
            .args(invocation.arguments())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| RunError::Spawn {
                program: invocation.program().to_path_buf(),
                source: Arc::new(source),
            })?;
        let outcome = ExitOutcome::from(status);
        debug!(target: PROCESS_TARGET, command = %invocation, %outcome, "command finished");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_put_program_first() {
        let invocation = Invocation::new("/opt/pg/bin/pg_ctl")
            .arg("-D")
            .args(["/srv/pgdata", "start"]);
        assert_eq!(
            invocation.tokens(),
            vec!["/opt/pg/bin/pg_ctl", "-D", "/srv/pgdata", "start"]
        );
        assert_eq!(
            invocation.to_string(),
            "/opt/pg/bin/pg_ctl -D /srv/pgdata start"
        );
    }

    #[test]
    fn outcome_success_requires_zero_code() {
        assert!(ExitOutcome::SUCCESS.success());
        assert!(!ExitOutcome::from_code(3).success());
        assert!(!ExitOutcome::terminated().success());
    }

    #[test]
    fn system_runner_reports_missing_executable() {
        let invocation = Invocation::new("/nonexistent/pgrecipe/pg_ctl").arg("status");
        let result = SystemRunner.run(&invocation);
        let Err(RunError::Spawn { program, .. }) = result else {
            panic!("expected Spawn error, got {result:?}");
        };
        assert_eq!(program, Utf8PathBuf::from("/nonexistent/pgrecipe/pg_ctl"));
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_reports_exit_codes() {
        let ok = SystemRunner
            .run(&Invocation::new("/bin/sh").args(["-c", "exit 0"]))
            .expect("sh should run");
        assert!(ok.success());
        let failed = SystemRunner
            .run(&Invocation::new("/bin/sh").args(["-c", "exit 7"]))
            .expect("sh should run");
        assert_eq!(failed.code(), Some(7));
    }
}

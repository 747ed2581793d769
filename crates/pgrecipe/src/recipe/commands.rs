//! Post-initialisation commands and their failure report.

use std::fmt;

use camino::Utf8Path;

use crate::process::{ExitOutcome, Invocation};

/// One entry of the configured `cmds` list.
///
/// The first whitespace-separated word names an executable inside the binary
/// directory; the remaining words are passed to it as arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostInitCommand {
    line: String,
    program: String,
    arguments: Vec<String>,
}

impl PostInitCommand {
    /// Parses a single line, returning `None` for blank lines.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let mut words = line.split_whitespace();
        let program = words.next()?.to_owned();
        Some(Self {
            line: line.to_owned(),
            program,
            arguments: words.map(str::to_owned).collect(),
        })
    }

    /// The trimmed line as configured.
    #[must_use]
    pub fn line(&self) -> &str {
        &self.line
    }

    /// Executable name, relative to the binary directory.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Invocation of `<bin_dir>/<program> <arguments...>`.
    #[must_use]
    pub fn invocation(&self, bin_dir: &Utf8Path) -> Invocation {
        Invocation::new(bin_dir.join(&self.program)).args(self.arguments.iter().cloned())
    }
}

/// Splits a newline-separated command list, skipping empty entries.
#[must_use]
pub fn parse_commands(raw: &str) -> Vec<PostInitCommand> {
    raw.lines().filter_map(PostInitCommand::parse).collect()
}

/// Why a post-init command did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureStatus {
    /// The command ran and exited unsuccessfully.
    Exited(ExitOutcome),
    /// The command could not be launched.
    SpawnFailed {
        /// Rendered launch error.
        message: String,
    },
}

impl fmt::Display for FailureStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(outcome) => write!(formatter, "{outcome}"),
            Self::SpawnFailed { message } => write!(formatter, "not started: {message}"),
        }
    }
}

/// A post-init command that failed, paired with its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFailure {
    /// The configured command line.
    pub command: String,
    /// Exit status or launch failure.
    pub status: FailureStatus,
}

impl fmt::Display for CommandFailure {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} failed ({})", self.command, self.status)
    }
}

/// Result of running the post-init command list.
///
/// Failures never abort the list, so callers decide whether a partial failure
/// is fatal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandReport {
    executed: Vec<String>,
    failures: Vec<CommandFailure>,
}

impl CommandReport {
    pub(crate) fn record_success(&mut self, command: &PostInitCommand) {
        self.executed.push(command.line().to_owned());
    }

    pub(crate) fn record_failure(&mut self, command: &PostInitCommand, status: FailureStatus) {
        self.executed.push(command.line().to_owned());
        self.failures.push(CommandFailure {
            command: command.line().to_owned(),
            status,
        });
    }

    /// Every command attempted, in order.
    #[must_use]
    pub fn executed(&self) -> &[String] {
        &self.executed
    }

    /// Commands that failed, in order.
    #[must_use]
    pub fn failures(&self) -> &[CommandFailure] {
        &self.failures
    }

    /// Whether every attempted command succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn skips_blank_lines_and_keeps_order() {
        let commands = parse_commands("createdb app\n\n   \ncreateuser -s owner\r\n");
        let lines: Vec<&str> = commands.iter().map(PostInitCommand::line).collect();
        assert_eq!(lines, vec!["createdb app", "createuser -s owner"]);
    }

    #[rstest]
    #[case("cmd1", "/opt/pg/bin/cmd1")]
    #[case("  createdb   app  ", "/opt/pg/bin/createdb app")]
    fn joins_program_onto_bin_dir(#[case] line: &str, #[case] expected: &str) {
        let command = PostInitCommand::parse(line).expect("line is not blank");
        let invocation = command.invocation(Utf8Path::new("/opt/pg/bin"));
        assert_eq!(invocation.to_string(), expected);
    }

    #[test]
    fn report_tracks_failures_separately() {
        let first = PostInitCommand::parse("cmd1").expect("command");
        let second = PostInitCommand::parse("cmd2").expect("command");
        let mut report = CommandReport::default();
        report.record_failure(&first, FailureStatus::Exited(ExitOutcome::from_code(1)));
        report.record_success(&second);

        assert_eq!(report.executed(), ["cmd1", "cmd2"]);
        assert!(!report.is_success());
        assert_eq!(
            report.failures().first().map(ToString::to_string),
            Some("cmd1 failed (exit status 1)".to_owned())
        );
    }
}

//! Test doubles shared by the unit and behaviour tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use pgrecipe_config::{Config, ReadinessPolicy, RecipeSettings};
use tempfile::TempDir;

use crate::process::{ExitOutcome, Invocation, ProcessRunner, RunError};

/// Builds settings for `bin` and `pgdata` with no readiness wait.
pub(crate) fn settings_with(bin: &str, pgdata: &str) -> RecipeSettings {
    let config = Config {
        bin: Some(bin.to_owned()),
        pgdata: Some(pgdata.to_owned()),
        ..Config::default()
    };
    settings_from(&config)
}

/// Validates `config` and disables the readiness wait.
pub(crate) fn settings_from(config: &Config) -> RecipeSettings {
    match RecipeSettings::from_config(config) {
        Ok(settings) => settings.with_readiness(ReadinessPolicy::immediate()),
        Err(error) => panic!("test configuration is invalid: {error}"),
    }
}

/// Temporary build tree holding the parts directory, binaries and data
/// directory of one instance.
pub(crate) struct Sandbox {
    root: TempDir,
}

impl Sandbox {
    pub(crate) fn new() -> Self {
        let root = TempDir::new().expect("create temp dir");
        Self { root }
    }

    pub(crate) fn root(&self) -> &Utf8Path {
        Utf8Path::from_path(self.root.path()).expect("temp dir is UTF-8")
    }

    pub(crate) fn bin_dir(&self) -> Utf8PathBuf {
        self.root().join("bin")
    }

    pub(crate) fn pgdata(&self) -> Utf8PathBuf {
        self.root().join("pgdata")
    }

    pub(crate) fn parts_directory(&self) -> Utf8PathBuf {
        self.root().join("parts")
    }

    /// Configuration pointing every path into the sandbox.
    pub(crate) fn config(&self) -> Config {
        Config {
            bin: Some(self.bin_dir().into_string()),
            pgdata: Some(self.pgdata().into_string()),
            parts_directory: self.parts_directory().into_string(),
            name: "db".to_owned(),
            ..Config::default()
        }
    }

    pub(crate) fn create_pgdata(&self) {
        fs::create_dir_all(self.pgdata()).expect("create pgdata");
    }

    pub(crate) fn write_pid_file(&self) {
        self.create_pgdata();
        fs::write(self.pgdata().join("postmaster.pid"), "4242\n").expect("write pid file");
    }

    pub(crate) fn pid_file_exists(&self) -> bool {
        self.pgdata().join("postmaster.pid").exists()
    }
}

/// Runner that records invocations and returns scripted exit codes.
///
/// Exit codes are looked up by the executable's file name, or by
/// `"pg_ctl <command>"` for control tool invocations. When the server is
/// simulated, successful `pg_ctl` calls create and remove the on-disk markers
/// the real engine would, and `psql` only succeeds while the process-id file
/// exists.
#[derive(Default)]
pub(crate) struct ScriptedRunner {
    invocations: RefCell<Vec<Invocation>>,
    exits: HashMap<String, i32>,
    spawn_failures: Vec<String>,
    server_pgdata: Option<Utf8PathBuf>,
}

impl ScriptedRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Runner that mimics `pg_ctl` and `psql` for the cluster at `pgdata`.
    pub(crate) fn server(pgdata: Utf8PathBuf) -> Self {
        Self {
            server_pgdata: Some(pgdata),
            ..Self::default()
        }
    }

    pub(crate) fn with_exit(mut self, key: &str, code: i32) -> Self {
        self.exits.insert(key.to_owned(), code);
        self
    }

    pub(crate) fn failing_to_spawn(mut self, program: &str) -> Self {
        self.spawn_failures.push(program.to_owned());
        self
    }

    pub(crate) fn invocations(&self) -> Vec<Invocation> {
        self.invocations.borrow().clone()
    }

    /// Compact rendering of each invocation: `pg_ctl start`, `psql`, `cmd1`.
    pub(crate) fn summary(&self) -> Vec<String> {
        self.invocations.borrow().iter().map(invocation_key).collect()
    }

    fn scripted_exit(&self, invocation: &Invocation) -> Option<i32> {
        self.exits
            .get(&invocation_key(invocation))
            .or_else(|| self.exits.get(program_name(invocation)))
            .copied()
    }

    fn simulate(pgdata: &Utf8Path, invocation: &Invocation) -> ExitOutcome {
        match program_name(invocation) {
            "pg_ctl" => simulate_pg_ctl(invocation),
            "psql" if pgdata.join("postmaster.pid").exists() => ExitOutcome::SUCCESS,
            "psql" => ExitOutcome::from_code(2),
            _ => ExitOutcome::SUCCESS,
        }
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, invocation: &Invocation) -> Result<ExitOutcome, RunError> {
        self.invocations.borrow_mut().push(invocation.clone());
        let name = program_name(invocation);
        if self.spawn_failures.iter().any(|failing| failing == name) {
            return Err(RunError::Spawn {
                program: invocation.program().to_path_buf(),
                source: Arc::new(io::Error::from(io::ErrorKind::NotFound)),
            });
        }
        if let Some(code) = self.scripted_exit(invocation) {
            return Ok(ExitOutcome::from_code(code));
        }
        if let Some(pgdata) = &self.server_pgdata {
            return Ok(Self::simulate(pgdata, invocation));
        }
        Ok(ExitOutcome::SUCCESS)
    }
}

fn program_name(invocation: &Invocation) -> &str {
    invocation.program().file_name().unwrap_or_default()
}

fn invocation_key(invocation: &Invocation) -> String {
    let name = program_name(invocation);
    match control_command(invocation) {
        Some(command) if name == "pg_ctl" => format!("{name} {command}"),
        _ => name.to_owned(),
    }
}

/// The token following `-D <pgdata>` in a proxied `pg_ctl` invocation.
fn control_command(invocation: &Invocation) -> Option<&str> {
    let arguments = invocation.arguments();
    let position = arguments.iter().position(|token| token == "-D")?;
    arguments.get(position + 2).map(String::as_str)
}

fn data_directory(invocation: &Invocation) -> Option<Utf8PathBuf> {
    let arguments = invocation.arguments();
    let position = arguments.iter().position(|token| token == "-D")?;
    arguments.get(position + 1).map(Utf8PathBuf::from)
}

fn simulate_pg_ctl(invocation: &Invocation) -> ExitOutcome {
    let (Some(pgdata), Some(command)) = (data_directory(invocation), control_command(invocation))
    else {
        return ExitOutcome::from_code(1);
    };
    let pid_file = pgdata.join("postmaster.pid");
    match command {
        "initdb" => {
            fs::create_dir_all(&pgdata).expect("simulate initdb");
            ExitOutcome::SUCCESS
        }
        "start" | "restart" if pgdata.exists() => {
            fs::write(&pid_file, "4242\n").expect("simulate start");
            ExitOutcome::SUCCESS
        }
        "stop" if pid_file.exists() => {
            fs::remove_file(&pid_file).expect("simulate stop");
            ExitOutcome::SUCCESS
        }
        _ => ExitOutcome::from_code(1),
    }
}

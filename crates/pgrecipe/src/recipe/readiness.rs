//! Waits applied after the server is started or stopped.

use std::thread;
use std::time::Duration;

use pgrecipe_config::{ReadinessPolicy, RecipeSettings};
use tracing::{debug, warn};

use super::RecipeError;
use super::marker_exists;
use crate::process::ProcessRunner;
use crate::proxy::psql;

const READINESS_TARGET: &str = "pgrecipe::recipe::readiness";

/// Trivial query used to confirm the server accepts connections. Query
/// results are discarded so stdout stays reserved for command output.
const READINESS_QUERY: &[&str] = &[
    "--no-psqlrc",
    "--quiet",
    "--tuples-only",
    "--output",
    "/dev/null",
    "--command",
    "SELECT 1",
];

/// Waits for the server to come up according to the configured policy.
///
/// Exhausting the polling budget is logged, not raised: `pg_ctl` already
/// reported its own result and the recipe never retries a start.
pub(super) fn wait_after_start<R: ProcessRunner>(
    runner: &R,
    settings: &RecipeSettings,
) -> Result<(), RecipeError> {
    match settings.readiness() {
        ReadinessPolicy::FixedDelay(delay) => {
            pause(delay);
            Ok(())
        }
        ReadinessPolicy::Poll { attempts, interval } => {
            for attempt in 1..=attempts {
                if server_accepts_queries(runner, settings)? {
                    debug!(target: READINESS_TARGET, attempt, "server is ready");
                    return Ok(());
                }
                pause(interval);
            }
            warn!(
                target: READINESS_TARGET,
                attempts,
                pgdata = %settings.pgdata(),
                "server did not report ready"
            );
            Ok(())
        }
    }
}

/// Waits for the server to go down according to the configured policy.
pub(super) fn wait_after_stop(settings: &RecipeSettings) -> Result<(), RecipeError> {
    match settings.readiness() {
        ReadinessPolicy::FixedDelay(delay) => {
            pause(delay);
            Ok(())
        }
        ReadinessPolicy::Poll { attempts, interval } => {
            let pid_file = settings.pid_file();
            for _ in 0..attempts {
                if !marker_exists(&pid_file)? {
                    return Ok(());
                }
                pause(interval);
            }
            warn!(
                target: READINESS_TARGET,
                attempts,
                pid_file = %pid_file,
                "process-id file still present after stop"
            );
            Ok(())
        }
    }
}

fn server_accepts_queries<R: ProcessRunner>(
    runner: &R,
    settings: &RecipeSettings,
) -> Result<bool, RecipeError> {
    if !marker_exists(&settings.pid_file())? {
        return Ok(false);
    }
    let arguments: Vec<String> = READINESS_QUERY.iter().map(|arg| (*arg).to_owned()).collect();
    let outcome = psql(runner, settings, &arguments)?;
    Ok(outcome.success())
}

fn pause(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}

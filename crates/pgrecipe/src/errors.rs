//! Error types for the command-line runtime.

use std::io;
use std::sync::Arc;

use pgrecipe_config::SettingsError;
use thiserror::Error;

use crate::proxy::ProxyError;
use crate::recipe::RecipeError;
use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("invalid configuration: {0}")]
    Settings(#[from] SettingsError),
    #[error("failed to initialise telemetry: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Proxy(#[from] ProxyError),
    #[error(transparent)]
    Recipe(#[from] RecipeError),
    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),
}

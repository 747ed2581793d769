//! Error types for recipe operations.

use std::io;
use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::process::ExitOutcome;
use crate::proxy::ProxyError;

/// Errors raised while installing, updating, starting or stopping an instance.
#[derive(Debug, Clone, Error)]
pub enum RecipeError {
    /// The recipe location could not be created.
    #[error("failed to create location {path}: {source}")]
    CreateLocation {
        /// Location that could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
    /// A filesystem predicate could not be evaluated.
    #[error("failed to inspect {path}: {source}")]
    Inspect {
        /// Path whose existence could not be determined.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
    /// `pg_ctl initdb` exited unsuccessfully.
    #[error("initialising {pgdata} failed with {outcome}")]
    InitializeFailed {
        /// Data directory that was being initialised.
        pgdata: Utf8PathBuf,
        /// Exit outcome of `pg_ctl initdb`.
        outcome: ExitOutcome,
    },
    /// A proxy could not build or launch its command.
    #[error(transparent)]
    Proxy(#[from] ProxyError),
}

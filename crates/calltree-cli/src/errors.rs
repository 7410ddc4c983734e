//! Error types for the CLI runtime.

use std::sync::Arc;

use calltree_graph::GraphError;
use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("invalid symbol {0:?}: symbols must be non-empty and contain no whitespace")]
    InvalidSymbol(String),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

//! Error types shared by the registry, the chart dispatcher and the HTTP layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Failure while running one of the vnStat executables.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Exited {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("{program} has no stdout handle")]
    NoStdout { program: String },
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Interface does not exist: {0}")]
    UnknownInterface(String),

    #[error("invalid query string: {0}")]
    InvalidQuery(String),

    #[error("chart renderer unavailable: {0}")]
    Spawn(String),

    #[error("chart rendering failed: {0}")]
    RenderFailed(String),
}

impl From<ProcessError> for GatewayError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::Exited { stderr, status, .. } => {
                let diag = stderr.trim();
                if diag.is_empty() {
                    GatewayError::RenderFailed(status)
                } else {
                    GatewayError::RenderFailed(diag.to_string())
                }
            }
            other => GatewayError::Spawn(other.to_string()),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        // Only the unknown-interface message echoes request input; parser and tool
        // diagnostics stay in the log.
        match self {
            GatewayError::UnknownInterface(_) => {
                (StatusCode::BAD_REQUEST, self.to_string()).into_response()
            }
            GatewayError::InvalidQuery(_) => {
                (StatusCode::BAD_REQUEST, "Invalid request parameters").into_response()
            }
            GatewayError::Spawn(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "chart renderer unavailable",
            )
                .into_response(),
            GatewayError::RenderFailed(_) => {
                (StatusCode::BAD_GATEWAY, "chart rendering failed").into_response()
            }
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

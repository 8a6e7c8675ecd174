//! Error types and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result alias used across the workspace.
pub type AppResult<T> = Result<T, AppError>;

/// Request-scoped failures. None of them is fatal to the process.
#[derive(Debug, Error)]
pub enum AppError {
    /// Opening a connection failed (network, authentication, unknown database).
    #[error("{0}")]
    Connection(String),

    /// The server rejected or failed a statement.
    #[error("{0}")]
    Query(String),

    /// Liveness probe failed.
    #[error("Service unhealthy: {0}")]
    Unhealthy(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Connection(_) | AppError::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unhealthy(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Stable identifier for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Connection(_) => "connection",
            AppError::Query(_) => "query",
            AppError::Unhealthy(_) => "unhealthy",
        }
    }

    /// Turns any failure into a liveness failure, keeping its message.
    pub fn into_unhealthy(self) -> Self {
        match self {
            AppError::Connection(msg) | AppError::Query(msg) => AppError::Unhealthy(msg),
            unhealthy => unhealthy,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Query(err.to_string())
    }
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable message, usually the driver's.
    pub detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = self.to_string();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), status = status.as_u16(), %detail, "request failed");
        } else {
            tracing::warn!(kind = self.kind(), status = status.as_u16(), %detail, "request failed");
        }
        (status, Json(ErrorBody { detail })).into_response()
    }
}

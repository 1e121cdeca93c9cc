//! Error types for lifeos-api
//!
//! Every handler returns [`ApiResult`]. Client errors (4xx) are reported with
//! `"status": "fail"` and their message; server errors (5xx) with `"status": "error"`.
//! Infrastructure failures are logged and replaced by a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or semantically invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Body failed field validation (400)
    #[error("Validation Error: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// Missing or invalid credentials (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Uniqueness conflict (409)
    #[error("{0}")]
    Conflict(String),

    /// Generative model failed or returned unusable output (502)
    #[error("{0}")]
    Upstream(String),

    /// Failure with a message safe to show the client (500)
    #[error("{0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Common error: {0}")]
    Common(#[from] lifeos_common::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

const GENERIC_SERVER_ERROR: &str = "Something went very wrong!";

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Common(lifeos_common::Error::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Common(lifeos_common::Error::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_)
            | ApiError::Database(_)
            | ApiError::Common(_)
            | ApiError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the client
    fn public_message(&self) -> String {
        match self {
            ApiError::Database(_) | ApiError::Other(_) => GENERIC_SERVER_ERROR.to_string(),
            ApiError::Common(lifeos_common::Error::NotFound(msg))
            | ApiError::Common(lifeos_common::Error::InvalidInput(msg)) => msg.clone(),
            ApiError::Common(_) => GENERIC_SERVER_ERROR.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        }

        let body = Json(json!({
            "status": if status.is_server_error() { "error" } else { "fail" },
            "message": self.public_message(),
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// True when a database error is a UNIQUE constraint violation
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

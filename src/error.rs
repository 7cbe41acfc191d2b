use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::password::HashError;

// Domain errors surface directly at the HTTP boundary with a fixed status
// and a human-readable message. Nothing is retried or swallowed.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    // Missing, malformed, expired, and unknown-subject credentials all
    // collapse into this one variant; the cause is only logged.
    #[error("Invalid or expired token")]
    Unauthenticated,
    #[error("{0}")]
    NotFound(String),
    #[error("Something went wrong")]
    Database(#[from] sqlx::Error),
    #[error("Something went wrong")]
    Internal(String),
}

impl From<jsonwebtoken::errors::Error> for ApiError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<HashError> for ApiError {
    fn from(err: HashError) -> Self {
        match err {
            HashError::PasswordTooLong => ApiError::Validation(err.to_string()),
            HashError::Rng => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // The caller gets a generic message; the real failure goes to the log.
        match &self {
            ApiError::Database(err) => tracing::error!(error = %err, "store failure"),
            ApiError::Internal(detail) => tracing::error!(%detail, "internal failure"),
            _ => {}
        }

        let body = Json(json!({
            "status": if status.is_server_error() { "error" } else { "fail" },
            "message": self.to_string(),
        }));

        if matches!(self, ApiError::Unauthenticated) {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

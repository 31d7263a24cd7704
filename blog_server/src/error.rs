use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::auth::AuthError;

/// Failures a blog handler can report to the client.
#[derive(Debug, Error)]
pub enum BlogError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Permission denied")]
    Forbidden,

    #[error("{message}")]
    Validation { field: &'static str, message: String },

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl BlogError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        BlogError::Validation {
            field,
            message: message.into(),
        }
    }
}

impl IntoResponse for BlogError {
    fn into_response(self) -> Response {
        match self {
            BlogError::NotFound(_) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": self.to_string() }))).into_response()
            }
            BlogError::Forbidden => {
                (StatusCode::FORBIDDEN, Json(json!({ "error": self.to_string() }))).into_response()
            }
            BlogError::Validation { field, ref message } => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": message, "field": field })),
            )
                .into_response(),
            BlogError::Conflict(ref message) => {
                (StatusCode::CONFLICT, Json(json!({ "error": message }))).into_response()
            }
            BlogError::Auth(e) => e.into_response(),
            BlogError::Database(ref e) => {
                error!(error = %e, "Unhandled database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

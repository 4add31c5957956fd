use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Errors surfaced by services and extractors, rendered as `{"message": ...}`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed or missing request input.
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// No usable bearer credential. The reason is logged, never returned.
    #[error("Unauthorized")]
    Unauthenticated(&'static str),

    /// Authenticated, but the role or ownership check failed.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                json!({ "message": message, "field": field }),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "message": msg })),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "message": msg })),
            AppError::Unauthenticated(reason) => {
                warn!(reason, "request rejected: unauthenticated");
                (StatusCode::UNAUTHORIZED, json!({ "message": "Unauthorized" }))
            }
            AppError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, json!({ "message": "Unauthorized" }))
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "message": msg })),
            AppError::Internal(e) => {
                error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Unreadable, mistyped or non-JSON request bodies.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(status = %rejection.status(), "request body rejected");
        AppError::BadRequest(rejection.body_text())
    }
}

/// Failures reported by the user and todo stores.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Email \"{0}\" is already taken")]
    EmailTaken(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::EmailTaken(email) => {
                AppError::Conflict(format!("Email \"{email}\" is already taken"))
            }
            StoreError::Database(db) => AppError::Internal(anyhow::Error::new(db)),
        }
    }
}

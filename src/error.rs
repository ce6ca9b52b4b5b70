use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Invalid request fields")]
    InvalidFields(FieldErrors),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Insert lost a race on the unique slug column
    #[error("Slug already taken")]
    SlugTaken,

    #[error("Database client not initialised")]
    Unavailable,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True for errors caused by the request itself (4xx) or a missing backend
    pub fn is_expected(&self) -> bool {
        !matches!(self, AppError::Database(_) | AppError::Internal(_))
    }

    /// Log an unexpected failure in full and replace it with a generic message
    pub fn or_internal(self, message: &str) -> AppError {
        if self.is_expected() {
            return self;
        }
        tracing::error!("{}: {:?}", message, self);
        AppError::Internal(message.to_string())
    }
}

/// Implement IntoResponse to convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::Internal(ref msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.as_str()),
            AppError::Validation(ref msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::InvalidFields(fields) => {
                return (StatusCode::BAD_REQUEST, Json(json!({ "error": fields }))).into_response();
            }
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, msg.as_str()),
            AppError::SlugTaken => (
                StatusCode::CONFLICT,
                crate::constants::ERR_SLUG_TAKEN,
            ),
            AppError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Database client not initialised",
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

/// Field-level validation report, serialized as
/// `{ "formErrors": [...], "fieldErrors": { "field": [...] } }`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrors {
    pub form_errors: Vec<String>,
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report that is not tied to a single field (e.g. malformed JSON)
    pub fn form(message: impl Into<String>) -> Self {
        Self {
            form_errors: vec![message.into()],
            field_errors: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.field_errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Report `field` when its trimmed value is longer than `max` characters
    pub fn check_max_chars(&mut self, field: impl Into<String>, value: &str, max: usize) {
        if value.trim().chars().count() > max {
            self.add(field, format!("String must contain at most {max} character(s)"));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }

    /// `Ok(())` when nothing was reported
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::InvalidFields(self))
        }
    }
}

/// Result type alias for application results
pub type Result<T> = std::result::Result<T, AppError>;

//! Application error types and result alias.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application result type alias
pub type Result<T> = std::result::Result<T, AppError>;

/// Field-keyed validation errors, aggregated across every failing rule.
///
/// Nested payload blocks use dotted keys (`identification.title`); bulk
/// payloads prefix the item index (`1.identification.title`).
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct FieldErrors(pub BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `field`.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Merge another error map under a key prefix.
    pub fn merge_prefixed(&mut self, prefix: &str, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0
                .entry(format!("{prefix}.{field}"))
                .or_default()
                .extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok(())` when no rule failed, otherwise a validation error.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Not found error
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Lifecycle guard violation (transition not allowed from current state)
    #[error("{0}")]
    Guard(String),

    /// Field validation errors
    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Address parse error
    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    /// JWT error
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Validation error on a single field.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.push(field, message);
        AppError::Validation(errors)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR", msg.clone()),
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "Database operation failed".to_string(),
            ),
            AppError::Migration(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "MIGRATION_ERROR",
                "Database migration failed".to_string(),
            ),
            AppError::Authentication(msg) => (StatusCode::UNAUTHORIZED, "AUTH_ERROR", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Guard(msg) => {
                // Rejected lifecycle transitions use the bare `{"error": ...}`
                // body the API contract promises.
                tracing::debug!(error = %msg, "Lifecycle guard violation");
                return (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response();
            }
            AppError::Validation(errors) => {
                let body = Json(json!({
                    "code": "VALIDATION_ERROR",
                    "message": "One or more fields failed validation",
                    "errors": errors,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "IO_ERROR",
                "IO operation failed".to_string(),
            ),
            AppError::AddrParse(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "ADDR_PARSE_ERROR",
                "Invalid address".to_string(),
            ),
            AppError::Jwt(_) => (StatusCode::UNAUTHORIZED, "JWT_ERROR", "Invalid token".to_string()),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg.clone(),
            ),
        };

        // Log the error
        tracing::error!(error = %self, code = code, "Request error");

        let body = Json(json!({
            "code": code,
            "message": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors_aggregate() {
        let mut errors = FieldErrors::new();
        errors.push("title", "Title must be at least 3 characters long");
        errors.push("title", "Title is required");
        errors.push("status", "Invalid status");
        assert_eq!(errors.0["title"].len(), 2);
        assert_eq!(errors.0["status"].len(), 1);
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_field_errors_merge_prefixed() {
        let mut inner = FieldErrors::new();
        inner.push("title", "too short");
        let mut outer = FieldErrors::new();
        outer.merge_prefixed("identification", inner);
        assert!(outer.0.contains_key("identification.title"));
    }

    #[test]
    fn test_empty_field_errors_ok() {
        assert!(FieldErrors::new().into_result().is_ok());
    }
}

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// AppError
///
/// Application-level error type shared by the repository, the auth extractors and
/// every handler. Implements [`IntoResponse`] so handlers can simply use `?`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A referenced entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Request payload failed declarative validation.
    #[error("{0}")]
    Validation(String),

    /// Request is well-formed JSON but semantically unusable.
    #[error("{0}")]
    BadRequest(String),

    /// Write would violate a uniqueness rule.
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

const UNIQUE_VIOLATION_PREFIX: &str = "Duplicate value violates unique constraint: ";

/// Convenience alias used throughout the crate.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Builds the canonical "<Entity> not found with id: <id>" error.
    pub fn not_found(entity: &str, id: i64) -> Self {
        AppError::NotFound(format!("{entity} not found with id: {id}"))
    }

    /// Conflict raised for a write that would break the named uniqueness rule.
    pub fn unique_violation(constraint: &str) -> Self {
        AppError::Conflict(format!("{UNIQUE_VIOLATION_PREFIX}{constraint}"))
    }

    /// Name of the unique constraint a write tripped over, if that is what failed.
    pub fn violated_constraint(&self) -> Option<&str> {
        match self {
            AppError::Conflict(msg) => msg.strip_prefix(UNIQUE_VIOLATION_PREFIX),
            AppError::Database(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some("23505") =>
            {
                db_err.constraint()
            }
            _ => None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Database(err) => classify_sqlx_error(err).0,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => format!("{field}: {msg}"),
                    None => format!("{field}: invalid value ({})", e.code),
                })
            })
            .collect();
        // HashMap iteration order is unstable; keep responses deterministic.
        messages.sort();
        AppError::Validation(messages.join("; "))
    }
}

impl From<argon2::password_hash::Error> for AppError {
    fn from(err: argon2::password_hash::Error) -> Self {
        AppError::Internal(format!("password hashing failed: {err}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
            }
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            AppError::Database(err) => classify_sqlx_error(err),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, Json(json!({ "message": message, "code": code }))).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique violations (SQLSTATE 23505) on a `uq_*` constraint map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            let constraint = db_err.constraint().unwrap_or("unknown");
            if constraint.starts_with("uq_") {
                return (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("{UNIQUE_VIOLATION_PREFIX}{constraint}"),
                );
            }
            tracing::error!(error = %db_err, "Unexpected unique violation");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

// crates/backend-lib/src/error.rs

//! Central error types + Axum integration.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use homeinv_common::{ErrorBody, ErrorDetail};
use thiserror::Error;

use crate::validation::ValidationErrors;

/// Failures returned by the auth orchestrator and the HTTP layer.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Wrong password or unknown user; the two are never told apart.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account locked until {until}")]
    AccountLocked { until: chrono::DateTime<chrono::Utc> },

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Invalid format: {0}")]
    FormatInvalid(ValidationErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but the role does not allow the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("User {0} not found")]
    UserNotFound(i64),

    #[error("Invalid token: {0}")]
    TokenInvalid(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Storage error: {0}")]
    InternalStorage(#[source] DirectoryError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials
            | AuthError::Unauthorized(_)
            | AuthError::TokenInvalid(_)
            | AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            AuthError::AccountLocked { .. } => StatusCode::LOCKED,
            AuthError::DuplicateEntry(_) => StatusCode::CONFLICT,
            AuthError::FormatInvalid(_) => StatusCode::BAD_REQUEST,
            AuthError::UserNotFound(_) => StatusCode::NOT_FOUND,
            AuthError::InternalStorage(_) | AuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }

    /// Get the numeric error code for this error
    pub fn error_code(&self) -> u16 {
        match self {
            AuthError::InvalidCredentials => 1001,
            AuthError::AccountLocked { .. } => 1002,
            AuthError::Unauthorized(_) => 1003,
            AuthError::Forbidden(_) => 1004,
            AuthError::TokenExpired => 1005,
            AuthError::TokenInvalid(_) => 1006,
            AuthError::UserNotFound(_) => 1007,
            AuthError::FormatInvalid(_) => 2003,
            AuthError::DuplicateEntry(_) => 2004,
            AuthError::InternalStorage(_) => 3001,
            AuthError::Internal(_) => 5001,
        }
    }

    /// Get a sanitized message suitable for production use
    pub fn sanitized_message(&self) -> String {
        match self {
            AuthError::InvalidCredentials => "Username or password is incorrect.".to_string(),
            AuthError::AccountLocked { .. } => {
                "Too many failed login attempts; account is temporarily locked.".to_string()
            },
            AuthError::Unauthorized(_) => {
                "User is not authorized for the requested action.".to_string()
            },
            AuthError::Forbidden(_) => "Operation is not permitted for this role.".to_string(),
            AuthError::TokenExpired => "The authentication token is no longer valid.".to_string(),
            AuthError::TokenInvalid(_) => "Provided token is malformed or unrecognized.".to_string(),
            AuthError::UserNotFound(_) => "User was not found.".to_string(),
            AuthError::FormatInvalid(errors) => {
                format!("Field value does not match expected format: {}", errors.fields().join(", "))
            },
            AuthError::DuplicateEntry(_) => {
                "An entry with the same unique field already exists.".to_string()
            },
            AuthError::InternalStorage(_) | AuthError::Internal(_) => {
                "An internal server error occurred".to_string()
            },
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Use detailed messages in development, sanitized in production
        let message = if cfg!(debug_assertions) {
            self.to_string()
        } else {
            self.sanitized_message()
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: self.error_code(),
                message,
            },
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<DirectoryError> for AuthError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Duplicate { field, .. } => {
                AuthError::DuplicateEntry(format!("{field} already registered"))
            },
            DirectoryError::NotFound(id) => AuthError::UserNotFound(id),
            other => AuthError::InternalStorage(other),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid(err.to_string()),
        }
    }
}

/// Failures raised by a [`UserDirectory`](crate::storage::UserDirectory) backend.
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Insert would violate the username/email uniqueness constraint.
    #[error("Duplicate {field}: {value}")]
    Duplicate { field: &'static str, value: String },

    #[error("User {0} does not exist")]
    NotFound(i64),

    #[error("Directory unavailable: {0}")]
    Unavailable(String),
}

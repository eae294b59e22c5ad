// Rust guideline compliant 2026-10-13

//! Error handling for Libris application services.

use libris_core::Error as CoreError;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for application-level operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Stable error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The requested resource or entity was not found.
    NotFound,
    /// The requested state transition is invalid.
    InvalidTransition,
    /// Order issuance rejected the allocation.
    IssueRejected,
    /// Stored or submitted data failed validation.
    ValidationError,
    /// The request included invalid inputs.
    InvalidInput,
    /// The request clashes with existing data.
    Conflict,
    /// No valid session.
    Unauthenticated,
    /// The session's role may not perform the operation.
    Forbidden,
    /// The library lock could not be acquired.
    LockTimeout,
    /// Configuration is invalid.
    ConfigError,
    /// IO failure while reading or writing library data.
    IoError,
    /// JSON serialization or parsing failed.
    JsonError,
    /// Password hashing failed.
    HashError,
    /// The library has not been initialized.
    RepoNotInitialized,
}

/// Application-level errors with stable mapping to error codes.
#[derive(Debug, Error)]
pub enum AppError {
    /// Library directory is missing or not initialized.
    #[error("Libris library not initialized at {path}. Run 'libris init' first.")]
    RepoNotInitialized {
        /// Path where `.libris` was expected.
        path: PathBuf,
    },

    /// Invalid input was provided by the caller.
    #[error("{0}")]
    InvalidInput(String),

    /// A looked-up entity does not exist or is not visible to the caller.
    #[error("{0} not found")]
    NotFound(String),

    /// The request clashes with existing data.
    #[error("{0}")]
    Conflict(String),

    /// Missing, unknown or expired session.
    #[error("Unauthorized: {0}")]
    Unauthenticated(String),

    /// Authenticated, but with the wrong role.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Error from core library operations.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// IO error not represented by core errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Password hashing failed.
    #[error(transparent)]
    PasswordHash(#[from] bcrypt::BcryptError),
}

impl From<libris_core::IssueError> for AppError {
    fn from(err: libris_core::IssueError) -> Self {
        AppError::Core(CoreError::Issue(err))
    }
}

impl AppError {
    /// Shorthand for [`AppError::NotFound`].
    pub fn not_found(what: impl Into<String>) -> Self {
        AppError::NotFound(what.into())
    }

    /// Returns a stable error code for the error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::RepoNotInitialized { .. } => ErrorCode::RepoNotInitialized,
            AppError::InvalidInput(_) => ErrorCode::InvalidInput,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::Conflict(_) => ErrorCode::Conflict,
            AppError::Unauthenticated(_) => ErrorCode::Unauthenticated,
            AppError::Forbidden(_) => ErrorCode::Forbidden,
            AppError::Io(_) => ErrorCode::IoError,
            AppError::PasswordHash(_) => ErrorCode::HashError,
            AppError::Core(core) => match core {
                CoreError::NotFound { .. } => ErrorCode::NotFound,
                CoreError::InvalidTransition(_) => ErrorCode::InvalidTransition,
                CoreError::Issue(_) => ErrorCode::IssueRejected,
                CoreError::Invalid(_) => ErrorCode::ValidationError,
                CoreError::LockTimeout(_) => ErrorCode::LockTimeout,
                CoreError::Config(_) => ErrorCode::ConfigError,
                CoreError::Io(_) => ErrorCode::IoError,
                CoreError::Json(_) => ErrorCode::JsonError,
            },
        }
    }

    /// HTTP-equivalent status for the error.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self.code() {
            ErrorCode::InvalidInput
            | ErrorCode::InvalidTransition
            | ErrorCode::IssueRejected
            | ErrorCode::ValidationError => 400,
            ErrorCode::Unauthenticated => 401,
            ErrorCode::Forbidden => 403,
            ErrorCode::NotFound => 404,
            ErrorCode::Conflict => 409,
            ErrorCode::RepoNotInitialized
            | ErrorCode::LockTimeout
            | ErrorCode::ConfigError
            | ErrorCode::IoError
            | ErrorCode::JsonError
            | ErrorCode::HashError => 500,
        }
    }

    /// Returns true for failures the caller could not have caused.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        self.http_status() >= 500
    }

    /// Returns structured details for errors that benefit from extra context.
    #[must_use]
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::RepoNotInitialized { path } => Some(serde_json::json!({
                "path": path,
            })),
            AppError::Core(CoreError::NotFound { entity, id }) => Some(serde_json::json!({
                "entity": entity,
                "id": id,
            })),
            AppError::Core(CoreError::Issue(issue)) => Some(serde_json::json!({
                "reason": format!("{issue:?}"),
            })),
            _ => None,
        }
    }
}

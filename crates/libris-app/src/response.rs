// Rust guideline compliant 2026-10-15

//! Response envelopes for machine-readable command output.

use crate::error::{AppError, ErrorCode};
use serde::Serialize;

/// Success envelope: `{"status": "ok", "result": ...}`.
#[derive(Debug, Serialize)]
pub struct SuccessEnvelope<T> {
    /// Always `ok`.
    pub status: &'static str,
    /// Result payload.
    pub result: T,
}

impl<T> SuccessEnvelope<T> {
    /// Wraps a result.
    #[must_use]
    pub fn new(result: T) -> Self {
        Self { status: "ok", result }
    }
}

/// Error envelope: `{"code", "message", "status", "details"?}`.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    /// Stable error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// HTTP-equivalent status.
    pub status: u16,
    /// Optional structured details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorEnvelope {
    /// Builds the envelope for an application error.
    ///
    /// Internal failures are logged at error level on the way out.
    #[must_use]
    pub fn from_error(error: &AppError) -> Self {
        if error.is_internal() {
            tracing::error!(code = ?error.code(), error = %error, "internal error");
        }
        Self {
            code: error.code(),
            message: error.to_string(),
            status: error.http_status(),
            details: error.details(),
        }
    }
}

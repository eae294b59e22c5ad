// Rust guideline compliant 2026-10-16

//! Command implementations for the Libris CLI.
//!
//! Commands are grouped by the role that runs them. Each one opens the
//! library, calls a single application service and hands the result to the
//! active formatter.

pub mod accountant;
pub mod admin;
pub mod auth;
pub mod doctor;
pub mod init;
pub mod librarian;
pub mod reader;
pub mod sweep;

use crate::output::{Listing, Message, OutputFormatter, Record};
use libris_app::{AppError, ErrorCode, ErrorEnvelope, Library, RepoContext};
use std::path::{Path, PathBuf};

/// Shared state for one CLI invocation.
pub struct Context {
    repo_root: Option<PathBuf>,
    formatter: Box<dyn OutputFormatter>,
}

impl Context {
    /// Creates a context.
    ///
    /// # Arguments
    ///
    /// * `repo_root` - Library root from `--repo`; the current directory
    ///   when absent
    /// * `formatter` - Formatter for results and errors
    #[must_use]
    pub fn new(repo_root: Option<PathBuf>, formatter: Box<dyn OutputFormatter>) -> Self {
        Self {
            repo_root,
            formatter,
        }
    }

    /// Library root given on the command line.
    #[must_use]
    pub fn repo_root(&self) -> Option<&Path> {
        self.repo_root.as_deref()
    }

    /// Active formatter.
    #[must_use]
    pub fn formatter(&self) -> &dyn OutputFormatter {
        self.formatter.as_ref()
    }

    /// Opens the library with the saved session.
    ///
    /// # Errors
    ///
    /// Returns an error if the library is not initialized or its config or
    /// session file is unreadable.
    pub fn open(&self) -> libris_app::Result<Library> {
        let repo = RepoContext::discover(self.repo_root())?;
        Library::open(repo)
    }

    /// Prints a list result.
    pub fn emit_list(&self, listing: &Listing) {
        println!("{}", self.formatter.format_list(listing).trim_end());
    }

    /// Prints a single record.
    pub fn emit_record(&self, record: &Record) {
        println!("{}", self.formatter.format_record(record).trim_end());
    }

    /// Prints a confirmation.
    pub fn emit_message(&self, message: &Message) {
        println!("{}", self.formatter.format_message(message).trim_end());
    }
}

/// Builds the error envelope for any command failure.
///
/// Application errors keep their code and status. Anything else is an IO
/// or serialization failure of the CLI itself, or bad command input.
#[must_use]
pub fn envelope_for(err: &anyhow::Error) -> ErrorEnvelope {
    if let Some(app) = err.downcast_ref::<AppError>() {
        return ErrorEnvelope::from_error(app);
    }

    let (code, status) = if err.downcast_ref::<std::io::Error>().is_some() {
        (ErrorCode::IoError, 500)
    } else if err.downcast_ref::<serde_json::Error>().is_some() {
        (ErrorCode::JsonError, 500)
    } else {
        (ErrorCode::InvalidInput, 400)
    };
    if status >= 500 {
        tracing::error!(error = %err, "internal error");
    }
    ErrorEnvelope {
        code,
        message: err.to_string(),
        status,
        details: None,
    }
}

/// Parses a `LEFT:RIGHT` pair of ids.
///
/// # Errors
///
/// Returns [`AppError::InvalidInput`] naming `what` if the value is not two
/// colon-separated numbers.
pub fn parse_id_pair(value: &str, what: &str) -> libris_app::Result<(u64, u64)> {
    let invalid = || AppError::InvalidInput(format!("Invalid {what}: '{value}'"));
    let (left, right) = value.split_once(':').ok_or_else(invalid)?;
    let left = left.trim().parse().map_err(|_| invalid())?;
    let right = right.trim().parse().map_err(|_| invalid())?;
    Ok((left, right))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_keeps_app_error_code() {
        let err = anyhow::Error::new(AppError::Forbidden("ADMIN access required".into()));
        let envelope = envelope_for(&err);
        assert_eq!(envelope.code, ErrorCode::Forbidden);
        assert_eq!(envelope.status, 403);
        assert_eq!(envelope.message, "Forbidden: ADMIN access required");
    }

    #[test]
    fn test_envelope_for_plain_errors() {
        let err = anyhow::anyhow!("bad flag combination");
        assert_eq!(envelope_for(&err).status, 400);

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let envelope = envelope_for(&anyhow::Error::new(io));
        assert_eq!(envelope.code, ErrorCode::IoError);
        assert_eq!(envelope.status, 500);
    }

    #[test]
    fn test_parse_id_pair() {
        assert_eq!(parse_id_pair("3:17", "allocation").unwrap(), (3, 17));
        assert_eq!(parse_id_pair(" 3 : 17 ", "allocation").unwrap(), (3, 17));
        let err = parse_id_pair("3-17", "allocation").unwrap_err();
        assert_eq!(err.to_string(), "Invalid allocation: '3-17'");
        assert!(parse_id_pair("x:1", "allocation").is_err());
    }
}

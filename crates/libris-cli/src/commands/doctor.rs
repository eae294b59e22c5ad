// Rust guideline compliant 2026-10-16

//! Implementation of the `libris doctor` command.
//!
//! Checks JSONL syntax and record validity line by line, then the
//! cross-record invariants of the loaded ledger.

use crate::commands::Context;
use crate::output::{Listing, Message};
use crate::terminal::print_warning;
use anyhow::Result;
use libris_app::{Library, RepoContext};
use libris_core::Record;
use serde::Serialize;
use std::path::Path;

/// One problem found by the doctor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Line number or record, e.g. `line 4` or `copy 7`.
    pub subject: String,
    /// What is wrong.
    pub message: String,
}

/// Checks every line of a ledger file.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read.
pub fn scan_lines(path: &Path) -> Result<Vec<Finding>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)?;
    let mut findings = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let subject = format!("line {}", idx + 1);
        match serde_json::from_str::<Record>(line) {
            Ok(record) => {
                if let Err(err) = record.validate() {
                    findings.push(Finding {
                        subject,
                        message: err.to_string(),
                    });
                }
            }
            Err(err) => findings.push(Finding {
                subject,
                message: format!("Invalid JSON ({err})"),
            }),
        }
    }
    Ok(findings)
}

/// Runs all checks and prints the findings.
///
/// # Returns
///
/// True when the library is healthy.
///
/// # Errors
///
/// Returns an error if the library is not initialized or cannot be read.
pub fn execute(ctx: &Context) -> Result<bool> {
    let repo = RepoContext::discover(ctx.repo_root())?;
    let mut findings = scan_lines(repo.ledger_path())?;

    // A line that fails validation aborts loading, so only check invariants
    // on a file that parsed cleanly.
    if findings.is_empty() {
        let library = Library::open(repo)?;
        let violations = library.read(|ledger, _| Ok(ledger.check_invariants()))?;
        findings.extend(violations.into_iter().map(|v| Finding {
            subject: v.subject,
            message: v.message,
        }));
    }

    if findings.is_empty() {
        ctx.emit_message(&Message::new(
            "No problems found",
            serde_json::json!({ "healthy": true, "findings": [] }),
        ));
        return Ok(true);
    }

    let listing = Listing::new(&["Where", "Problem"], &findings, |f| {
        vec![f.subject.clone(), f.message.clone()]
    })?
    .with_json(serde_json::json!({ "healthy": false, "findings": findings }));
    ctx.emit_list(&listing);
    if !ctx.formatter().is_json() {
        print_warning(&format!("{} problem(s) found", findings.len()));
    }
    Ok(false)
}

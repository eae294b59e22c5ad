// Rust guideline compliant 2026-10-16

//! Implementation of the `libris sweep` command.
//!
//! Every command already sweeps lapsed holds before it runs; this one does
//! only that, for scheduled use.

use crate::commands::Context;
use crate::output::Message;
use anyhow::Result;
use libris_core::Role;
use serde_json::json;

/// Expires lapsed reservations and releases their copies.
///
/// # Errors
///
/// Returns an error unless signed in as ADMIN, or if the library cannot
/// be opened or written.
pub fn execute(ctx: &Context) -> Result<()> {
    let library = ctx.open()?;
    let expired = library.sweep_as(Role::Admin)?;
    let text = match expired.len() {
        0 => "No reservations to expire".to_string(),
        1 => "Expired 1 reservation".to_string(),
        n => format!("Expired {n} reservations"),
    };
    ctx.emit_message(&Message::new(text, json!({ "expired": expired })));
    Ok(())
}

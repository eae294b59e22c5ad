// Rust guideline compliant 2026-10-16

//! `libris auth` commands: register, login, logout and whoami.

use crate::commands::Context;
use crate::output::{or_dash, timestamp, Message, Record};
use anyhow::Result;
use libris_app::auth::{self, Registration};
use libris_app::UserView;
use serde_json::json;

pub(crate) fn user_record(user: &UserView) -> serde_json::Result<Record> {
    Ok(Record::new(user)?
        .field("ID", user.id)
        .field("Name", &user.name)
        .field("Email", &user.email)
        .field("Role", user.role)
        .field("Phone", or_dash(user.phone.as_deref()))
        .optional("Address", user.address.as_deref().filter(|a| !a.is_empty()))
        .field("Created", timestamp(user.created_at))
        .field("Updated", timestamp(user.updated_at)))
}

/// Registers a new reader account.
///
/// # Errors
///
/// Returns an error if a field is missing or the email is taken.
pub fn register(ctx: &Context, form: Registration) -> Result<()> {
    let library = ctx.open()?;
    let user = auth::register(&library, form)?;
    ctx.emit_record(&user_record(&user)?);
    Ok(())
}

/// Signs in and saves the session for later commands.
///
/// # Errors
///
/// Returns an error for an unknown email or a wrong password.
pub fn login(ctx: &Context, email: &str, password: &str) -> Result<()> {
    let mut library = ctx.open()?;
    let outcome = auth::login(&mut library, email, password)?;
    ctx.emit_message(&Message::new(
        format!(
            "Signed in as {} ({}); session valid until {}",
            outcome.user.name,
            outcome.user.role,
            timestamp(outcome.expires_at)
        ),
        serde_json::to_value(&outcome)?,
    ));
    Ok(())
}

/// Ends the saved session.
///
/// # Errors
///
/// Returns an error if the ledger or session file cannot be updated.
pub fn logout(ctx: &Context) -> Result<()> {
    let mut library = ctx.open()?;
    let removed = auth::logout(&mut library)?;
    let text = if removed {
        "Signed out"
    } else {
        "No active session"
    };
    ctx.emit_message(&Message::new(text, json!({ "signed_out": removed })));
    Ok(())
}

/// Shows the signed-in account.
///
/// # Errors
///
/// Returns an error without a valid session.
pub fn whoami(ctx: &Context) -> Result<()> {
    let library = ctx.open()?;
    let user = auth::whoami(&library)?;
    ctx.emit_record(&user_record(&user)?);
    Ok(())
}

// Rust guideline compliant 2026-10-16

//! Implementation of the `libris init` command.
//!
//! Creates the `.libris` directory with a default config and an empty
//! ledger, and optionally the first ADMIN account.

use crate::commands::Context;
use crate::output::Message;
use anyhow::Result;
use libris_app::{users, Library, RepoContext};
use serde_json::json;

/// Credentials for the bootstrap admin.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    /// Display name; "Administrator" when empty.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

/// Initializes a library at `--repo` or the current directory.
///
/// # Arguments
///
/// * `ctx` - Invocation context
/// * `admin` - Optional first ADMIN account to create
///
/// # Errors
///
/// Returns an error if:
/// - The current directory cannot be resolved
/// - The `.libris` files cannot be written
/// - The admin account cannot be created
pub fn execute(ctx: &Context, admin: Option<AdminSeed>) -> Result<()> {
    let root = match ctx.repo_root() {
        Some(root) => root.to_path_buf(),
        None => std::env::current_dir()?,
    };
    let (repo, created) = RepoContext::init(&root)?;
    tracing::info!(path = %repo.libris_dir().display(), created, "library initialized");

    let admin_view = match admin {
        Some(seed) => {
            let library = Library::open(repo.clone())?;
            Some(users::bootstrap_admin(
                &library,
                &seed.name,
                &seed.email,
                &seed.password,
            )?)
        }
        None => None,
    };

    let mut text = if created {
        format!("Initialized Libris library at {}", repo.libris_dir().display())
    } else {
        format!("Libris library already present at {}", repo.libris_dir().display())
    };
    if let Some(admin) = &admin_view {
        text.push_str(&format!("\nCreated admin account {} (id {})", admin.email, admin.id));
    }

    ctx.emit_message(&Message::new(
        text,
        json!({
            "path": repo.libris_dir(),
            "created": created,
            "admin": admin_view,
        }),
    ));
    Ok(())
}

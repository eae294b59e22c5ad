// Rust guideline compliant 2026-10-14

//! Accounts, password hashing and login sessions.
//!
//! Passwords are stored as bcrypt hashes. A login issues an opaque random
//! token that is stored both in the ledger and in `.libris/session.json`.
//! Later commands resolve the token back to a user and check the role the
//! command requires.

use crate::error::{AppError, Result};
use crate::library::Library;
use crate::repo::RepoContext;
use crate::users::UserView;
use chrono::{DateTime, Duration, Utc};
use libris_core::{Ledger, Role, Session, User};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Random bytes in a session token.
const TOKEN_BYTES: usize = 32;

/// The authenticated caller of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
    /// Account id.
    pub user_id: u64,
    /// Display name.
    pub name: String,
    /// Account role.
    pub role: Role,
}

impl Actor {
    /// Checks that the caller holds exactly `role`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] otherwise.
    pub fn require(&self, role: Role) -> Result<()> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "{} access required, signed in as {}",
                role, self.role
            )))
        }
    }
}

/// Registration form for a new reader.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Registration {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Optional postal address.
    pub address: Option<String>,
}

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    /// Session token.
    pub token: String,
    /// Token expiry.
    pub expires_at: DateTime<Utc>,
    /// The signed-in account.
    pub user: UserView,
}

#[derive(Debug, Serialize, Deserialize)]
struct SavedSession {
    token: String,
}

/// Fresh session token: hex of bytes drawn from the thread-local CSPRNG.
fn new_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill(&mut bytes);
    bytes
        .iter()
        .fold(String::with_capacity(TOKEN_BYTES * 2), |mut out, b| {
            let _ = write!(out, "{b:02x}");
            out
        })
}

/// Lower-cases and trims an email address.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Hashes a password with bcrypt at the given work factor.
///
/// # Errors
///
/// Returns [`AppError::PasswordHash`] if `cost` is outside bcrypt's range.
pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    Ok(bcrypt::hash(password, cost)?)
}

/// Checks a password against a stored bcrypt hash.
///
/// A hash that bcrypt cannot parse never matches.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    match bcrypt::verify(password, stored) {
        Ok(matched) => matched,
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash is unreadable");
            false
        }
    }
}

/// Finds a user by (normalized) email.
#[must_use]
pub fn find_by_email<'a>(ledger: &'a Ledger, email: &str) -> Option<&'a User> {
    let email = normalize_email(email);
    ledger.users.values().find(|u| u.email == email)
}

/// Resolves a session token to the signed-in user.
///
/// # Errors
///
/// Returns [`AppError::Unauthenticated`] if the token is missing, unknown,
/// expired, or points at a deleted user.
pub fn authenticate(ledger: &Ledger, token: Option<&str>, now: DateTime<Utc>) -> Result<Actor> {
    let token = token.ok_or_else(|| {
        AppError::Unauthenticated("not signed in, run 'libris auth login'".to_string())
    })?;
    let session = ledger
        .sessions
        .get(token)
        .ok_or_else(|| AppError::Unauthenticated("unknown session".to_string()))?;
    if session.expires_at <= now {
        return Err(AppError::Unauthenticated("session expired".to_string()));
    }
    let user = ledger
        .users
        .get(&session.user_id)
        .ok_or_else(|| AppError::Unauthenticated("account no longer exists".to_string()))?;

    Ok(Actor {
        user_id: user.id,
        name: user.name.clone(),
        role: user.role,
    })
}

/// Reads the token saved by the last login, if any.
///
/// # Errors
///
/// Returns an error if the session file exists but cannot be read.
pub fn load_saved_token(repo: &RepoContext) -> Result<Option<String>> {
    let path = repo.session_path();
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    match serde_json::from_str::<SavedSession>(&content) {
        Ok(saved) => Ok(Some(saved.token)),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable session file");
            Ok(None)
        }
    }
}

/// Creates a READER account.
///
/// # Errors
///
/// Returns [`AppError::InvalidInput`] if name, email or password is
/// missing, and [`AppError::Conflict`] if the email is taken.
pub fn register(library: &Library, form: Registration) -> Result<UserView> {
    if form.name.trim().is_empty() || form.email.trim().is_empty() || form.password.is_empty() {
        return Err(AppError::InvalidInput(
            "Name, email and password are required".to_string(),
        ));
    }
    let email = normalize_email(&form.email);
    let password_hash = hash_password(&form.password, library.config().password_cost)?;

    library.transaction(|ledger, now| {
        if find_by_email(ledger, &email).is_some() {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }
        let id = ledger.next_user_id();
        let user = User {
            id,
            name: form.name.trim().to_string(),
            email,
            password_hash,
            role: Role::Reader,
            phone: form.phone.filter(|p| !p.trim().is_empty()),
            address: Some(form.address.unwrap_or_default()),
            gender: None,
            birth_date: None,
            created_at: now,
            updated_at: now,
        };
        user.validate()?;
        tracing::info!(user_id = id, "reader registered");
        let view = UserView::from(&user);
        ledger.users.insert(id, user);
        Ok(view)
    })
}

/// Signs in and remembers the session for later commands.
///
/// # Errors
///
/// Returns [`AppError::NotFound`] for an unknown email and
/// [`AppError::Unauthenticated`] for a wrong password.
pub fn login(library: &mut Library, email: &str, password: &str) -> Result<LoginOutcome> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AppError::InvalidInput(
            "Email and password are required".to_string(),
        ));
    }
    let ttl = Duration::hours(i64::from(library.config().session_ttl_hours));

    let outcome = library.transaction(|ledger, now| {
        let user = find_by_email(ledger, email).ok_or_else(|| AppError::not_found("User"))?;
        if !verify_password(password, &user.password_hash) {
            return Err(AppError::Unauthenticated("wrong password".to_string()));
        }

        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            libris_core::Error::Config(format!("session_ttl_hours overflows from {now}"))
        })?;
        let token = new_token();
        let session = Session {
            token: token.clone(),
            user_id: user.id,
            issued_at: now,
            expires_at,
        };
        let outcome = LoginOutcome {
            token: token.clone(),
            expires_at: session.expires_at,
            user: UserView::from(user),
        };

        let purged = ledger.purge_sessions(now);
        ledger.sessions.insert(token, session);
        tracing::info!(user_id = outcome.user.id, purged, "signed in");
        Ok(outcome)
    })?;

    let saved = SavedSession {
        token: outcome.token.clone(),
    };
    std::fs::write(
        library.repo().session_path(),
        serde_json::to_vec_pretty(&saved).map_err(libris_core::Error::from)?,
    )?;
    library.set_token(Some(outcome.token.clone()));
    Ok(outcome)
}

/// Ends the current session.
///
/// # Returns
///
/// True if a session was removed.
///
/// # Errors
///
/// Returns an error if the ledger or session file cannot be updated.
pub fn logout(library: &mut Library) -> Result<bool> {
    let removed = match library.token() {
        Some(token) => {
            let token = token.to_string();
            library.transaction(|ledger, _| Ok(ledger.sessions.remove(&token).is_some()))?
        }
        None => false,
    };

    let path = library.repo().session_path();
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    library.set_token(None);
    if removed {
        tracing::info!("signed out");
    }
    Ok(removed)
}

/// Returns the signed-in account.
///
/// # Errors
///
/// Returns [`AppError::Unauthenticated`] without a valid session.
pub fn whoami(library: &Library) -> Result<UserView> {
    let token = library.token();
    library.read(|ledger, now| {
        let actor = authenticate(ledger, token, now)?;
        Ok(UserView::from(ledger.user(actor.user_id)?))
    })
}

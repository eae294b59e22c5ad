// Rust guideline compliant 2026-10-14

//! Account administration.
//!
//! ADMIN accounts are invisible here: they cannot be listed, shown, edited
//! or deleted, and no ADMIN can be created except by `bootstrap_admin`.

use crate::auth::{find_by_email, hash_password, normalize_email};
use crate::error::{AppError, Result};
use crate::library::Library;
use chrono::{DateTime, Utc};
use libris_core::{BorrowingStatus, Ledger, Role, User};
use serde::{Deserialize, Serialize};

/// Public view of an account; never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    /// Account id.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Role.
    pub role: Role,
    /// Phone number.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            phone: user.phone.clone(),
            address: user.address.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Staff or reader account to create.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
    /// LIBRARIAN, ACCOUNTANT or READER.
    pub role: Role,
    /// Phone number.
    pub phone: Option<String>,
}

/// Partial account update; `None` leaves a field as it is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    /// New name.
    pub name: Option<String>,
    /// New email.
    pub email: Option<String>,
    /// New phone.
    pub phone: Option<String>,
    /// New role.
    pub role: Option<Role>,
    /// New password.
    pub password: Option<String>,
}

fn assignable(role: Role) -> Result<()> {
    if role == Role::Admin {
        return Err(AppError::InvalidInput(
            "Invalid role. Allowed: LIBRARIAN, ACCOUNTANT, READER".to_string(),
        ));
    }
    Ok(())
}

fn managed(ledger: &Ledger, id: u64) -> Result<&User> {
    ledger
        .users
        .get(&id)
        .filter(|u| u.role != Role::Admin)
        .ok_or_else(|| AppError::not_found("User"))
}

fn email_taken(ledger: &Ledger, email: &str, except: Option<u64>) -> bool {
    find_by_email(ledger, email).is_some_and(|u| Some(u.id) != except)
}

/// Lists non-admin accounts, newest first.
///
/// # Errors
///
/// Returns an auth error unless the caller is an ADMIN.
pub fn list_users(library: &Library) -> Result<Vec<UserView>> {
    library.read_as(Role::Admin, |ledger, _, _| {
        let mut users: Vec<UserView> = ledger
            .users
            .values()
            .filter(|u| u.role != Role::Admin)
            .map(UserView::from)
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(users)
    })
}

/// Shows one non-admin account.
///
/// # Errors
///
/// Returns [`AppError::NotFound`] for unknown or ADMIN accounts.
pub fn show_user(library: &Library, id: u64) -> Result<UserView> {
    library.read_as(Role::Admin, |ledger, _, _| {
        Ok(UserView::from(managed(ledger, id)?))
    })
}

/// Creates a LIBRARIAN, ACCOUNTANT or READER account.
///
/// # Errors
///
/// Returns [`AppError::InvalidInput`] for missing fields or an ADMIN role,
/// and [`AppError::Conflict`] if the email is taken.
pub fn create_user(library: &Library, form: NewUser) -> Result<UserView> {
    if form.name.trim().is_empty() || form.email.trim().is_empty() || form.password.is_empty() {
        return Err(AppError::InvalidInput(
            "Name, email and password are required".to_string(),
        ));
    }
    assignable(form.role)?;
    let password_hash = hash_password(&form.password, library.config().password_cost)?;

    library.transaction_as(Role::Admin, |ledger, actor, now| {
        let email = normalize_email(&form.email);
        if email_taken(ledger, &email, None) {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }
        let id = ledger.next_user_id();
        let user = User {
            id,
            name: form.name.trim().to_string(),
            email,
            password_hash,
            role: form.role,
            phone: form.phone,
            address: (form.role == Role::Reader).then(String::new),
            gender: None,
            birth_date: None,
            created_at: now,
            updated_at: now,
        };
        user.validate()?;
        tracing::info!(user_id = id, role = %user.role, by = actor.user_id, "account created");
        let view = UserView::from(&user);
        ledger.users.insert(id, user);
        Ok(view)
    })
}

/// Updates a non-admin account.
///
/// # Errors
///
/// Returns [`AppError::NotFound`] for unknown or ADMIN accounts,
/// [`AppError::InvalidInput`] for an ADMIN role, and
/// [`AppError::Conflict`] if the new email is taken.
pub fn update_user(library: &Library, id: u64, update: UserUpdate) -> Result<UserView> {
    if let Some(role) = update.role {
        assignable(role)?;
    }
    if update.password.as_deref() == Some("") {
        return Err(AppError::InvalidInput("Password cannot be empty".to_string()));
    }
    let password_hash = update
        .password
        .as_deref()
        .map(|pw| hash_password(pw, library.config().password_cost))
        .transpose()?;

    library.transaction_as(Role::Admin, |ledger, actor, now| {
        managed(ledger, id)?;
        let email = update.email.as_deref().map(normalize_email);
        if let Some(email) = &email {
            if email_taken(ledger, email, Some(id)) {
                return Err(AppError::Conflict("Email already in use".to_string()));
            }
        }

        let user = ledger
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("User"))?;
        let mut changed = false;
        if let Some(name) = update.name {
            user.name = name.trim().to_string();
            changed = true;
        }
        if let Some(email) = email {
            user.email = email;
            changed = true;
        }
        if let Some(phone) = update.phone {
            user.phone = Some(phone);
            changed = true;
        }
        if let Some(role) = update.role {
            user.role = role;
            changed = true;
        }
        if let Some(hash) = password_hash {
            user.password_hash = hash;
            changed = true;
        }
        if changed {
            user.updated_at = now;
            user.validate()?;
            tracing::info!(user_id = id, by = actor.user_id, "account updated");
        }
        Ok(UserView::from(&*user))
    })
}

/// Deletes a non-admin account with its sessions and reviews.
///
/// # Errors
///
/// Returns [`AppError::NotFound`] for unknown or ADMIN accounts and
/// [`AppError::Conflict`] while the user has active borrowings.
pub fn delete_user(library: &Library, id: u64) -> Result<UserView> {
    library.transaction_as(Role::Admin, |ledger, actor, _| {
        let view = UserView::from(managed(ledger, id)?);
        let active = ledger
            .borrowings
            .values()
            .filter(|b| b.reader_id == id && b.status == BorrowingStatus::Active)
            .count();
        if active > 0 {
            return Err(AppError::Conflict(format!(
                "User has {active} active borrowing(s)"
            )));
        }
        ledger.sessions.retain(|_, s| s.user_id != id);
        ledger.reviews.retain(|_, r| r.reader_id != id);
        ledger.users.remove(&id);
        tracing::info!(user_id = id, by = actor.user_id, "account deleted");
        Ok(view)
    })
}

/// Creates the first ADMIN account of a fresh library.
///
/// # Errors
///
/// Returns [`AppError::Conflict`] if an ADMIN already exists or the email
/// is taken, and [`AppError::InvalidInput`] for missing fields.
pub fn bootstrap_admin(
    library: &Library,
    name: &str,
    email: &str,
    password: &str,
) -> Result<UserView> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AppError::InvalidInput(
            "Admin email and password are required".to_string(),
        ));
    }
    let password_hash = hash_password(password, library.config().password_cost)?;

    library.transaction(|ledger, now| {
        if ledger.users.values().any(|u| u.role == Role::Admin) {
            return Err(AppError::Conflict("An admin account already exists".to_string()));
        }
        let email = normalize_email(email);
        if email_taken(ledger, &email, None) {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }
        let id = ledger.next_user_id();
        let user = User {
            id,
            name: if name.trim().is_empty() {
                "Administrator".to_string()
            } else {
                name.trim().to_string()
            },
            email,
            password_hash,
            role: Role::Admin,
            phone: None,
            address: None,
            gender: None,
            birth_date: None,
            created_at: now,
            updated_at: now,
        };
        user.validate()?;
        tracing::info!(user_id = id, "admin account created");
        let view = UserView::from(&user);
        ledger.users.insert(id, user);
        Ok(view)
    })
}

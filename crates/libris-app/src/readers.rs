// Rust guideline compliant 2026-10-16

//! Reader accounts: the librarian's reader directory and the reader's own
//! profile.

use crate::circulation::{borrow_view, BorrowView};
use crate::error::{AppError, Result};
use crate::library::Library;
use crate::list::{filter_rows, matches_search};
use crate::payments::{fine_reader, fine_view, FineView};
use chrono::{DateTime, NaiveDate, Utc};
use libris_core::{Borrowing, Fine, Ledger, Role, User};
use serde::{Deserialize, Serialize};

/// Row limit for the reader directory.
pub const READER_LIST_LIMIT: usize = 200;
/// Row limit for the loans and fines shown on a reader's detail page.
pub const READER_HISTORY_LIMIT: usize = 80;

/// A reader's contact and profile fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReaderProfile {
    /// Reader id.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Phone number.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Gender, free-form.
    pub gender: Option<String>,
    /// Date of birth.
    pub birth_date: Option<NaiveDate>,
    /// Registration time.
    pub registered_at: DateTime<Utc>,
}

impl From<&User> for ReaderProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            address: user.address.clone(),
            gender: user.gender.clone(),
            birth_date: user.birth_date,
            registered_at: user.created_at,
        }
    }
}

/// A reader with recent loans and fines.
#[derive(Debug, Clone, Serialize)]
pub struct ReaderDetail {
    /// Profile fields.
    pub profile: ReaderProfile,
    /// Loans, newest first.
    pub borrowings: Vec<BorrowView>,
    /// Fines, newest first.
    pub fines: Vec<FineView>,
}

/// Changes a reader makes to their own profile; `None` keeps a field.
///
/// An empty phone, gender or birth date clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
    /// New postal address.
    pub address: Option<String>,
    /// New gender.
    pub gender: Option<String>,
    /// New date of birth, `YYYY-MM-DD` or an RFC 3339 timestamp.
    pub birth_date: Option<String>,
}

fn reader(ledger: &Ledger, id: u64) -> Result<&User> {
    ledger
        .users
        .get(&id)
        .filter(|u| u.role == Role::Reader)
        .ok_or_else(|| AppError::not_found("Reader"))
}

fn trimmed_or_none(value: &str) -> Option<String> {
    Some(value.trim().to_string()).filter(|v| !v.is_empty())
}

/// Parses a date of birth; an empty string clears it.
///
/// # Errors
///
/// Returns [`AppError::InvalidInput`] if the value is not a date.
pub fn parse_birth_date(value: &str) -> Result<Option<NaiveDate>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|d| d.with_timezone(&Utc).date_naive())
        })
        .map(Some)
        .ok_or_else(|| AppError::InvalidInput("Invalid dob".to_string()))
}

/// Lists readers, newest registration first.
///
/// # Arguments
///
/// * `search` - Case-insensitive substring of name or email
///
/// # Errors
///
/// Returns an auth error unless the caller is a LIBRARIAN.
pub fn list_readers(library: &Library, search: Option<&str>) -> Result<Vec<ReaderProfile>> {
    let search = search.unwrap_or_default().to_string();
    library.read_as(Role::Librarian, |ledger, _, _| {
        let readers: Vec<&User> = ledger
            .users
            .values()
            .filter(|u| u.role == Role::Reader)
            .collect();
        let mut matched = filter_rows(readers, |u| {
            matches_search(&search, &[u.name.as_str(), u.email.as_str()])
        });
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(matched
            .into_iter()
            .take(READER_LIST_LIMIT)
            .map(ReaderProfile::from)
            .collect())
    })
}

/// Shows one reader with their recent loans and fines.
///
/// # Errors
///
/// Returns an auth error unless the caller is a LIBRARIAN, and
/// [`AppError::NotFound`] if `reader_id` is not a reader.
pub fn show_reader(library: &Library, reader_id: u64) -> Result<ReaderDetail> {
    library.read_as(Role::Librarian, |ledger, _, now| {
        let profile = ReaderProfile::from(reader(ledger, reader_id)?);

        let mut loans: Vec<&Borrowing> = ledger
            .borrowings
            .values()
            .filter(|b| b.reader_id == reader_id)
            .collect();
        loans.sort_by(|a, b| b.borrow_date.cmp(&a.borrow_date).then(b.id.cmp(&a.id)));

        let mut fines: Vec<&Fine> = ledger
            .fines
            .values()
            .filter(|f| fine_reader(ledger, f).is_some_and(|u| u.id == reader_id))
            .collect();
        fines.sort_by(|a, b| b.fine_date.cmp(&a.fine_date).then(b.id.cmp(&a.id)));

        Ok(ReaderDetail {
            profile,
            borrowings: loans
                .into_iter()
                .take(READER_HISTORY_LIMIT)
                .map(|b| borrow_view(ledger, b, now))
                .collect(),
            fines: fines
                .into_iter()
                .take(READER_HISTORY_LIMIT)
                .map(|f| fine_view(ledger, f))
                .collect(),
        })
    })
}

/// The signed-in reader's profile.
///
/// # Errors
///
/// Returns an auth error unless the caller is a READER.
pub fn my_profile(library: &Library) -> Result<ReaderProfile> {
    library.read_as(Role::Reader, |ledger, actor, _| {
        Ok(ReaderProfile::from(reader(ledger, actor.user_id)?))
    })
}

/// Updates the signed-in reader's profile.
///
/// # Errors
///
/// Returns [`AppError::InvalidInput`] for an unparseable birth date, and a
/// validation error if the new name is empty.
pub fn update_my_profile(library: &Library, update: ProfileUpdate) -> Result<ReaderProfile> {
    let birth_date = update
        .birth_date
        .as_deref()
        .map(parse_birth_date)
        .transpose()?;

    library.transaction_as(Role::Reader, |ledger, actor, now| {
        reader(ledger, actor.user_id)?;
        let user = ledger
            .users
            .get_mut(&actor.user_id)
            .ok_or_else(|| AppError::not_found("Reader"))?;

        if let Some(name) = update.name {
            user.name = name.trim().to_string();
        }
        if let Some(phone) = update.phone {
            user.phone = trimmed_or_none(&phone);
        }
        if let Some(address) = update.address {
            user.address = Some(address.trim().to_string());
        }
        if let Some(gender) = update.gender {
            user.gender = trimmed_or_none(&gender);
        }
        if let Some(birth_date) = birth_date {
            user.birth_date = birth_date;
        }
        user.updated_at = now;
        user.validate()?;
        tracing::info!(user_id = actor.user_id, "reader profile updated");
        Ok(ReaderProfile::from(&*user))
    })
}

// Rust guideline compliant 2026-10-16

//! `libris admin` commands: catalog and account administration.

use crate::commands::auth::user_record;
use crate::commands::Context;
use crate::output::{or_dash, timestamp, Listing, Message, Record};
use anyhow::Result;
use libris_app::catalog::{self, NewBook};
use libris_app::users::{self, NewUser, UserUpdate};
use libris_app::{BookSummary, UserView};

const BOOK_HEADERS: &[&str] = &["ID", "Title", "Author", "Genre", "Available", "Location", "Added"];

pub(crate) fn book_row(book: &BookSummary) -> Vec<String> {
    vec![
        book.id.to_string(),
        book.title.clone(),
        book.author.clone(),
        book.genre.clone(),
        format!("{}/{}", book.available_copies, book.total_copies),
        book.location.clone(),
        timestamp(book.created_at),
    ]
}

pub(crate) fn book_listing(books: &[BookSummary]) -> serde_json::Result<Listing> {
    Ok(Listing::new(BOOK_HEADERS, books, book_row)?.empty_text("No books found."))
}

pub(crate) fn book_record(book: &BookSummary) -> serde_json::Result<Record> {
    Ok(Record::new(book)?
        .field("ID", book.id)
        .field("Title", &book.title)
        .field("Author", &book.author)
        .field("Genre", &book.genre)
        .field("Language", &book.language)
        .field("Published", or_dash(book.published_year))
        .field("Location", &book.location)
        .field("Copies", format!("{} available of {}", book.available_copies, book.total_copies))
        .field("Rating", format!("{:.1} ({} reviews)", book.avg_rating, book.review_count))
        .optional("Description", Some(&book.description).filter(|d| !d.is_empty())))
}

/// Lists every book with copy counts.
///
/// # Errors
///
/// Returns an error unless signed in as ADMIN.
pub fn books_list(ctx: &Context) -> Result<()> {
    let library = ctx.open()?;
    let books = catalog::list_books(&library)?;
    ctx.emit_list(&book_listing(&books)?);
    Ok(())
}

/// Adds a book and its first copies.
///
/// # Errors
///
/// Returns an error for missing fields, a bad copy count or a duplicate.
pub fn books_add(ctx: &Context, form: NewBook) -> Result<()> {
    let library = ctx.open()?;
    let book = catalog::add_book(&library, form)?;
    ctx.emit_record(&book_record(&book)?);
    Ok(())
}

/// Adds shelf copies to a book.
///
/// # Errors
///
/// Returns an error if the book does not exist or `count` is zero.
pub fn books_add_copies(ctx: &Context, book_id: u64, count: u32) -> Result<()> {
    let library = ctx.open()?;
    let book = catalog::add_copies(&library, book_id, count)?;
    ctx.emit_record(&book_record(&book)?);
    Ok(())
}

/// Deletes a book with its copies and circulation history.
///
/// # Errors
///
/// Returns an error if the book does not exist.
pub fn books_delete(ctx: &Context, book_id: u64) -> Result<()> {
    let library = ctx.open()?;
    let deleted = catalog::delete_book(&library, book_id)?;
    let removed = &deleted.removed;
    ctx.emit_message(&Message::new(
        format!(
            "Deleted book {} ({} copies, {} reservations, {} borrowings, {} fines, {} payments)",
            deleted.book_id,
            removed.copies,
            removed.reservations,
            removed.borrowings,
            removed.fines,
            removed.payments
        ),
        serde_json::to_value(&deleted)?,
    ));
    Ok(())
}

fn user_listing(users: &[UserView]) -> serde_json::Result<Listing> {
    Ok(Listing::new(
        &["ID", "Name", "Email", "Role", "Phone", "Created"],
        users,
        |u| {
            vec![
                u.id.to_string(),
                u.name.clone(),
                u.email.clone(),
                u.role.to_string(),
                or_dash(u.phone.as_deref()),
                timestamp(u.created_at),
            ]
        },
    )?
    .empty_text("No users found."))
}

/// Lists staff and reader accounts.
///
/// # Errors
///
/// Returns an error unless signed in as ADMIN.
pub fn users_list(ctx: &Context) -> Result<()> {
    let library = ctx.open()?;
    let users = users::list_users(&library)?;
    ctx.emit_list(&user_listing(&users)?);
    Ok(())
}

/// Shows one account.
///
/// # Errors
///
/// Returns an error if the account does not exist or is an ADMIN.
pub fn users_show(ctx: &Context, id: u64) -> Result<()> {
    let library = ctx.open()?;
    let user = users::show_user(&library, id)?;
    ctx.emit_record(&user_record(&user)?);
    Ok(())
}

/// Creates a staff or reader account.
///
/// # Errors
///
/// Returns an error for missing fields, an ADMIN role or a taken email.
pub fn users_create(ctx: &Context, form: NewUser) -> Result<()> {
    let library = ctx.open()?;
    let user = users::create_user(&library, form)?;
    ctx.emit_record(&user_record(&user)?);
    Ok(())
}

/// Updates an account.
///
/// # Errors
///
/// Returns an error if the account does not exist or the email is taken.
pub fn users_update(ctx: &Context, id: u64, update: UserUpdate) -> Result<()> {
    let library = ctx.open()?;
    let user = users::update_user(&library, id, update)?;
    ctx.emit_record(&user_record(&user)?);
    Ok(())
}

/// Deletes an account.
///
/// # Errors
///
/// Returns an error if the account does not exist or still has loans.
pub fn users_delete(ctx: &Context, id: u64) -> Result<()> {
    let library = ctx.open()?;
    let user = users::delete_user(&library, id)?;
    ctx.emit_message(&Message::new(
        format!("Deleted user {} ({})", user.id, user.email),
        serde_json::to_value(&user)?,
    ));
    Ok(())
}

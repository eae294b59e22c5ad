// Rust guideline compliant 2026-10-14

//! Catalog services: admin book management and reader browsing.

use crate::error::{AppError, Result};
use crate::library::Library;
use crate::list::{clamp_or, filter_rows, matches_search, parse_copy_action};
use chrono::{DateTime, Utc};
use libris_core::models::{default_language, default_location};
use libris_core::models::{MAX_RATING, MIN_RATING};
use libris_core::{Book, BookCopy, CopyStatus, Ledger, RemovedCounts, Review, Role};
use serde::{Deserialize, Serialize};

/// Default page size for reader browsing.
pub const DEFAULT_PAGE_SIZE: u32 = 12;
/// Smallest page size a reader may ask for.
pub const MIN_PAGE_SIZE: u32 = 6;
/// Largest page size a reader may ask for.
pub const MAX_PAGE_SIZE: u32 = 24;
/// Reviews shown on a book's detail page.
pub const REVIEW_LIST_LIMIT: usize = 50;

/// A book with its copy counts and rating.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookSummary {
    /// Book id.
    pub id: u64,
    /// Title.
    pub title: String,
    /// Author.
    pub author: String,
    /// Genre.
    pub genre: String,
    /// Language.
    pub language: String,
    /// Publication year.
    pub published_year: Option<i32>,
    /// Shelf location.
    pub location: String,
    /// Description.
    pub description: String,
    /// Number of copies in any status.
    pub total_copies: u32,
    /// Number of AVAILABLE copies.
    pub available_copies: u32,
    /// Mean review rating, 0 without reviews.
    pub avg_rating: f64,
    /// Number of reviews.
    pub review_count: u32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl BookSummary {
    pub(crate) fn build(ledger: &Ledger, book: &Book) -> Self {
        let total = ledger.copies_of(book.id).count();
        let (sum, count) = ledger
            .reviews_of(book.id)
            .fold((0u32, 0u32), |(sum, count), r| {
                (sum + u32::from(r.rating), count + 1)
            });
        Self {
            id: book.id,
            title: book.title.clone(),
            author: book.author.clone(),
            genre: book.genre.clone(),
            language: book.language.clone(),
            published_year: book.published_year,
            location: book.location.clone(),
            description: book.description.clone(),
            total_copies: u32::try_from(total).unwrap_or(u32::MAX),
            available_copies: ledger.available_copy_count(book.id),
            avg_rating: if count == 0 {
                0.0
            } else {
                f64::from(sum) / f64::from(count)
            },
            review_count: count,
            created_at: book.created_at,
        }
    }
}

/// A book with its counts, every copy and its latest reviews.
#[derive(Debug, Clone, Serialize)]
pub struct BookDetail {
    /// The book and its counts.
    #[serde(flatten)]
    pub summary: BookSummary,
    /// Copies in id order.
    pub copies: Vec<BookCopy>,
    /// Reviews, newest first.
    pub reviews: Vec<ReviewView>,
}

/// A review with its author's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewView {
    /// Review id.
    pub id: u64,
    /// Rating, 1 to 5.
    pub rating: u8,
    /// Comment.
    pub comment: Option<String>,
    /// First submission time.
    pub created_at: DateTime<Utc>,
    /// Reviewer's display name.
    pub reader_name: String,
}

impl ReviewView {
    fn build(ledger: &Ledger, review: &Review) -> Self {
        Self {
            id: review.id,
            rating: review.rating,
            comment: review.comment.clone(),
            created_at: review.created_at,
            reader_name: ledger
                .users
                .get(&review.reader_id)
                .map_or_else(|| "Reader".to_string(), |u| u.name.clone()),
        }
    }
}

/// One page of reader browse results.
#[derive(Debug, Clone, Serialize)]
pub struct BookPage {
    /// 1-based page number.
    pub page: u32,
    /// Page size after clamping.
    pub limit: u32,
    /// Matching books across all pages.
    pub total: usize,
    /// Number of pages, at least 1.
    pub total_pages: usize,
    /// Books on this page.
    pub items: Vec<BookSummary>,
}

/// A book to add to the catalog.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewBook {
    /// Title.
    pub title: String,
    /// Author.
    pub author: String,
    /// Genre.
    pub genre: String,
    /// Number of copies to create.
    pub total_copies: u32,
    /// Language, `English` when absent.
    pub language: Option<String>,
    /// Publication year.
    pub published_year: Option<i32>,
    /// Description.
    pub description: Option<String>,
    /// Shelf location, `Shelf-A` when absent.
    pub location: Option<String>,
}

/// Sort order for reader browsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookSort {
    /// Newest first.
    #[default]
    New,
    /// Title A to Z.
    Title,
}

impl std::str::FromStr for BookSort {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "new" | "newest" => Ok(Self::New),
            "title" => Ok(Self::Title),
            _ => Err(AppError::InvalidInput(format!(
                "Invalid sort: {s} (expected new or title)"
            ))),
        }
    }
}

/// Reader browse query.
#[derive(Debug, Clone, Default)]
pub struct BrowseQuery {
    /// Substring of title or author.
    pub search: Option<String>,
    /// Exact genre, case-insensitive.
    pub genre: Option<String>,
    /// Sort order.
    pub sort: BookSort,
    /// 1-based page, 1 when absent.
    pub page: Option<u32>,
    /// Page size, clamped to 6..=24.
    pub limit: Option<u32>,
}

/// Result of a copy status change.
#[derive(Debug, Clone, Serialize)]
pub struct CopyChange {
    /// Copy id.
    pub copy_id: u64,
    /// Status before the change.
    pub from: CopyStatus,
    /// Status after the change.
    pub to: CopyStatus,
}

/// Result of a book deletion.
#[derive(Debug, Clone, Serialize)]
pub struct DeletedBook {
    /// Deleted book id.
    pub book_id: u64,
    /// Rows removed with it.
    pub removed: RemovedCounts,
}

fn newest_first(a: &Book, b: &Book) -> std::cmp::Ordering {
    b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))
}

/// Lists every book with its copy counts, newest first.
///
/// # Errors
///
/// Returns an auth error unless the caller is an ADMIN.
pub fn list_books(library: &Library) -> Result<Vec<BookSummary>> {
    library.read_as(Role::Admin, |ledger, _, _| {
        let mut books: Vec<&Book> = ledger.books.values().collect();
        books.sort_by(|a, b| newest_first(a, b));
        Ok(books
            .into_iter()
            .map(|book| BookSummary::build(ledger, book))
            .collect())
    })
}

/// Adds a book and its copies.
///
/// # Arguments
///
/// * `library` - Library to modify
/// * `form` - Book fields and the number of copies
///
/// # Returns
///
/// The new book with its counts.
///
/// # Errors
///
/// Returns [`AppError::InvalidInput`] for missing fields or a zero copy
/// count, and [`AppError::Conflict`] if a book with the same title and
/// author exists.
pub fn add_book(library: &Library, form: NewBook) -> Result<BookSummary> {
    if form.title.trim().is_empty() || form.author.trim().is_empty() || form.genre.trim().is_empty()
    {
        return Err(AppError::InvalidInput("Missing fields".to_string()));
    }
    if form.total_copies == 0 {
        return Err(AppError::InvalidInput("Invalid totalCopies".to_string()));
    }

    library.transaction_as(Role::Admin, |ledger, actor, now| {
        let title = form.title.trim().to_string();
        let author = form.author.trim().to_string();
        let duplicate = ledger.books.values().any(|b| {
            b.title.to_lowercase() == title.to_lowercase()
                && b.author.to_lowercase() == author.to_lowercase()
        });
        if duplicate {
            return Err(AppError::Conflict("Book already exists".to_string()));
        }

        let id = ledger.next_book_id();
        let book = Book {
            id,
            title,
            author,
            genre: form.genre.trim().to_string(),
            language: form
                .language
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(default_language),
            published_year: form.published_year,
            description: form.description.unwrap_or_default(),
            location: form
                .location
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(default_location),
            created_at: now,
            updated_at: now,
        };
        book.validate()?;
        ledger.books.insert(id, book);
        for _ in 0..form.total_copies {
            ledger.insert_copy(id, now)?;
        }
        tracing::info!(book_id = id, copies = form.total_copies, by = actor.user_id, "book added");

        let book = ledger.book(id)?;
        Ok(BookSummary::build(ledger, book))
    })
}

/// Adds AVAILABLE copies to an existing book.
///
/// # Errors
///
/// Returns [`AppError::InvalidInput`] for a zero count and a not-found
/// error for an unknown book.
pub fn add_copies(library: &Library, book_id: u64, count: u32) -> Result<BookSummary> {
    if count == 0 {
        return Err(AppError::InvalidInput(
            "Copy count must be positive".to_string(),
        ));
    }
    library.transaction_as(Role::Admin, |ledger, actor, now| {
        for _ in 0..count {
            ledger.insert_copy(book_id, now)?;
        }
        tracing::info!(book_id, count, by = actor.user_id, "copies added");
        let book = ledger.book(book_id)?;
        Ok(BookSummary::build(ledger, book))
    })
}

/// Deletes a book and everything that hangs off it.
///
/// # Errors
///
/// Returns a not-found error for an unknown book.
pub fn delete_book(library: &Library, book_id: u64) -> Result<DeletedBook> {
    library.transaction_as(Role::Admin, |ledger, actor, _| {
        let removed = ledger.remove_book(book_id)?;
        tracing::info!(book_id, by = actor.user_id, "book deleted");
        Ok(DeletedBook { book_id, removed })
    })
}

/// Marks a copy lost or damaged, or restores it to the shelf.
///
/// # Arguments
///
/// * `action` - `lost`, `damaged` or `restore`
///
/// # Errors
///
/// Returns [`AppError::InvalidInput`] for an unknown action and a
/// transition error if the copy's status does not allow it.
pub fn mark_copy(library: &Library, copy_id: u64, action: &str) -> Result<CopyChange> {
    let event = parse_copy_action(action)?;
    library.transaction_as(Role::Librarian, |ledger, actor, now| {
        let from = ledger.copy(copy_id)?.status;
        let to = ledger.transition_copy(copy_id, event, now)?;
        tracing::info!(copy_id, %from, %to, by = actor.user_id, "copy status changed");
        Ok(CopyChange { copy_id, from, to })
    })
}

/// Browses the catalog as a reader.
///
/// # Errors
///
/// Returns an auth error unless the caller is a READER.
pub fn browse_books(library: &Library, query: &BrowseQuery) -> Result<BookPage> {
    let limit = clamp_or(query.limit, DEFAULT_PAGE_SIZE, MIN_PAGE_SIZE, MAX_PAGE_SIZE);
    let page = query.page.unwrap_or(1).max(1);
    let search = query.search.clone().unwrap_or_default();
    let genre = query
        .genre
        .as_deref()
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_lowercase);

    library.read_as(Role::Reader, |ledger, _, _| {
        let books: Vec<&Book> = ledger.books.values().collect();
        let mut matched = filter_rows(books, |book| {
            matches_search(&search, &[book.title.as_str(), book.author.as_str()])
                && genre
                    .as_ref()
                    .map_or(true, |g| book.genre.to_lowercase() == *g)
        });
        match query.sort {
            BookSort::New => matched.sort_by(|a, b| newest_first(a, b)),
            BookSort::Title => {
                matched.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
            }
        }

        let total = matched.len();
        let per_page = limit as usize;
        let total_pages = total.div_ceil(per_page).max(1);
        let items = matched
            .into_iter()
            .skip((page as usize - 1) * per_page)
            .take(per_page)
            .map(|book| BookSummary::build(ledger, book))
            .collect();

        Ok(BookPage {
            page,
            limit,
            total,
            total_pages,
            items,
        })
    })
}

/// Shows one book with its counts, copies and latest reviews.
///
/// # Errors
///
/// Returns an auth error unless the caller is a READER, and a not-found
/// error for an unknown book.
pub fn book_detail(library: &Library, book_id: u64) -> Result<BookDetail> {
    library.read_as(Role::Reader, |ledger, _, _| {
        let book = ledger.book(book_id)?;
        let mut reviews: Vec<&Review> = ledger.reviews_of(book_id).collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(BookDetail {
            summary: BookSummary::build(ledger, book),
            copies: ledger.copies_of(book_id).cloned().collect(),
            reviews: reviews
                .into_iter()
                .take(REVIEW_LIST_LIMIT)
                .map(|r| ReviewView::build(ledger, r))
                .collect(),
        })
    })
}

/// Rates a book, replacing the caller's earlier review of it.
///
/// # Arguments
///
/// * `rating` - 1 to 5
/// * `comment` - Trimmed; blank means no comment
///
/// # Errors
///
/// Returns [`AppError::InvalidInput`] for a rating outside 1..=5, and a
/// not-found error for an unknown book.
pub fn review_book(
    library: &Library,
    book_id: u64,
    rating: u8,
    comment: Option<&str>,
) -> Result<Review> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(AppError::InvalidInput(format!(
            "Rating must be {MIN_RATING}..{MAX_RATING}"
        )));
    }
    let comment = comment
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    library.transaction_as(Role::Reader, |ledger, actor, now| {
        ledger.book(book_id)?;
        let existing = ledger.review_by(actor.user_id, book_id).map(|r| r.id);
        let review = match existing.and_then(|id| ledger.reviews.get_mut(&id)) {
            Some(review) => {
                review.rating = rating;
                review.comment = comment;
                review.updated_at = now;
                review.clone()
            }
            None => {
                let review = Review {
                    id: ledger.next_review_id(),
                    reader_id: actor.user_id,
                    book_id,
                    rating,
                    comment,
                    created_at: now,
                    updated_at: now,
                };
                ledger.reviews.insert(review.id, review.clone());
                review
            }
        };
        review.validate()?;
        tracing::info!(book_id, review_id = review.id, rating, "book reviewed");
        Ok(review)
    })
}

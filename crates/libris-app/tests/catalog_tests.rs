// Rust guideline compliant 2026-10-15

mod common;

use common::{Fixture, ALICE, BOB};
use libris_app::catalog::{self, BookSort, BrowseQuery, NewBook};
use libris_app::{circulation, payments, ErrorCode};
use libris_core::CopyStatus;

fn form(title: &str, author: &str, copies: u32) -> NewBook {
    NewBook {
        title: title.to_string(),
        author: author.to_string(),
        genre: "Science Fiction".to_string(),
        total_copies: copies,
        ..NewBook::default()
    }
}

#[test]
fn test_add_book_creates_copies_with_defaults() {
    let mut fixture = Fixture::new();
    let admin = fixture.act_as("admin");
    let book = catalog::add_book(admin, form("Dune", "Frank Herbert", 3)).unwrap();

    assert_eq!(book.total_copies, 3);
    assert_eq!(book.available_copies, 3);
    assert_eq!(book.language, "English");
    assert_eq!(book.location, "Shelf-A");
    assert!(fixture
        .ledger()
        .copies_of(book.id)
        .all(|c| c.status == CopyStatus::Available));
}

#[test]
fn test_add_book_validation() {
    let mut fixture = Fixture::new();
    let admin = fixture.act_as("admin");

    let err = catalog::add_book(admin, form("", "Nobody", 1)).unwrap_err();
    assert_eq!(err.to_string(), "Missing fields");
    let err = catalog::add_book(admin, form("Dune", "Frank Herbert", 0)).unwrap_err();
    assert_eq!(err.to_string(), "Invalid totalCopies");

    catalog::add_book(admin, form("Dune", "Frank Herbert", 1)).unwrap();
    let err = catalog::add_book(admin, form("DUNE", "frank herbert", 2)).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(catalog::list_books(admin).unwrap().len(), 1);
}

#[test]
fn test_list_books_newest_first_with_counts() {
    let mut fixture = Fixture::new();
    let first = fixture.add_book("First", 2);
    let second = fixture.add_book("Second", 1);
    fixture.add_copies(first, 2);

    let admin = fixture.act_as("admin");
    let books = catalog::list_books(admin).unwrap();
    assert_eq!(books[0].id, second);
    assert_eq!(books[1].id, first);
    assert_eq!(books[1].total_copies, 4);
}

#[test]
fn test_browse_pages_and_clamps() {
    let mut fixture = Fixture::new();
    for n in 1..=13 {
        fixture.add_book(&format!("Volume {n:02}"), 1);
    }
    let reader = fixture.act_as("alice");

    let page = catalog::browse_books(reader, &BrowseQuery::default()).unwrap();
    assert_eq!((page.page, page.limit), (1, 12));
    assert_eq!((page.total, page.total_pages), (13, 2));
    assert_eq!(page.items.len(), 12);
    assert_eq!(page.items[0].title, "Volume 13");

    let query = BrowseQuery {
        page: Some(2),
        sort: BookSort::Title,
        ..BrowseQuery::default()
    };
    let page = catalog::browse_books(reader, &query).unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].title, "Volume 13");

    let query = BrowseQuery {
        limit: Some(100),
        page: Some(0),
        ..BrowseQuery::default()
    };
    let page = catalog::browse_books(reader, &query).unwrap();
    assert_eq!((page.page, page.limit, page.total_pages), (1, 24, 1));

    let query = BrowseQuery {
        limit: Some(2),
        ..BrowseQuery::default()
    };
    assert_eq!(catalog::browse_books(reader, &query).unwrap().limit, 6);
}

#[test]
fn test_browse_search_and_genre() {
    let mut fixture = Fixture::new();
    fixture.add_book("Dune", 1);
    fixture.add_book("Emma", 1);
    let reader = fixture.act_as("bob");

    let query = BrowseQuery {
        search: Some("dUNE au".to_string()),
        ..BrowseQuery::default()
    };
    let page = catalog::browse_books(reader, &query).unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].title, "Dune");

    let query = BrowseQuery {
        genre: Some("poetry".to_string()),
        ..BrowseQuery::default()
    };
    let page = catalog::browse_books(reader, &query).unwrap();
    assert_eq!((page.total, page.total_pages), (0, 1));
}

#[test]
fn test_book_detail() {
    let mut fixture = Fixture::new();
    let book = fixture.add_book("Dune", 2);
    let reader = fixture.act_as("alice");

    let detail = catalog::book_detail(reader, book).unwrap();
    assert_eq!(detail.summary.title, "Dune");
    assert_eq!(detail.copies.len(), 2);
    assert_eq!(catalog::book_detail(reader, 99).unwrap_err().http_status(), 404);
}

#[test]
fn test_mark_copy_goes_through_state_machine() {
    let mut fixture = Fixture::new();
    let book = fixture.add_book("Dune", 1);
    let copy = fixture.ledger().copies_of(book).next().unwrap().id;
    let librarian = fixture.act_as("librarian");

    let change = catalog::mark_copy(librarian, copy, "lost").unwrap();
    assert_eq!((change.from, change.to), (CopyStatus::Available, CopyStatus::Lost));

    let err = circulation::borrow(librarian, ALICE, copy, None).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidTransition);
    let err = catalog::mark_copy(librarian, copy, "damaged").unwrap_err();
    assert_eq!(err.http_status(), 400);
    let err = catalog::mark_copy(librarian, copy, "melted").unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidInput);

    catalog::mark_copy(librarian, copy, "restore").unwrap();
    circulation::borrow(librarian, ALICE, copy, None).unwrap();
}

#[test]
fn test_delete_book_cascades() {
    let mut fixture = Fixture::new();
    let doomed = fixture.add_book("Doomed", 2);
    let kept = fixture.add_book("Kept", 1);
    let copies: Vec<u64> = fixture.ledger().copies_of(doomed).map(|c| c.id).collect();

    // One late loan with a paid fine, one plain loan.
    let librarian = fixture.act_as("librarian");
    circulation::borrow(librarian, ALICE, copies[0], Some(1)).unwrap();
    circulation::borrow(librarian, BOB, copies[1], None).unwrap();
    fixture.clock.advance(chrono::Duration::days(3));
    let librarian = fixture.act_as("librarian");
    let outcome = circulation::return_copy(librarian, copies[0]).unwrap();
    let fine = outcome.fine.unwrap();
    let accountant = fixture.act_as("accountant");
    payments::collect_fine(accountant, fine.id, None).unwrap();

    let admin = fixture.act_as("admin");
    let deleted = catalog::delete_book(admin, doomed).unwrap();
    assert_eq!(deleted.removed.copies, 2);
    assert_eq!(deleted.removed.borrowings, 2);
    assert_eq!(deleted.removed.fines, 1);
    assert_eq!(deleted.removed.payments, 1);

    let ledger = fixture.ledger();
    assert!(ledger.books.contains_key(&kept));
    assert!(!ledger.books.contains_key(&doomed));
    assert!(ledger.fines.is_empty());
    assert!(ledger.payments.is_empty());
    assert!(ledger.check_invariants().is_empty());
}

#[test]
fn test_review_upserts_per_reader_and_book() {
    let mut fixture = Fixture::new();
    let book = fixture.add_book("Dune", 1);

    let alice = fixture.act_as("alice");
    let first = catalog::review_book(alice, book, 3, Some("  slow start  ")).unwrap();
    assert_eq!(first.comment.as_deref(), Some("slow start"));
    fixture.clock.advance(chrono::Duration::hours(1));
    let alice = fixture.act_as("alice");
    let second = catalog::review_book(alice, book, 5, Some("   ")).unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.created_at, first.created_at);
    assert!(second.updated_at > first.updated_at);
    assert_eq!(second.comment, None);

    let bob = fixture.act_as("bob");
    catalog::review_book(bob, book, 4, None).unwrap();

    let detail = catalog::book_detail(bob, book).unwrap();
    assert_eq!(detail.summary.review_count, 2);
    assert!((detail.summary.avg_rating - 4.5).abs() < f64::EPSILON);
    let names: Vec<&str> = detail.reviews.iter().map(|r| r.reader_name.as_str()).collect();
    assert_eq!(names, ["Bob", "Alice"]);

    let page = catalog::browse_books(bob, &BrowseQuery::default()).unwrap();
    assert_eq!(page.items[0].review_count, 2);
}

#[test]
fn test_review_rating_bounds() {
    let mut fixture = Fixture::new();
    let book = fixture.add_book("Dune", 1);
    let alice = fixture.act_as("alice");
    for rating in [0, 6] {
        let err = catalog::review_book(alice, book, rating, None).unwrap_err();
        assert_eq!(err.to_string(), "Rating must be 1..5");
    }
    let err = catalog::review_book(alice, 99, 4, None).unwrap_err();
    assert_eq!(err.http_status(), 404);
    assert!(fixture.ledger().reviews.is_empty());

    let detail = catalog::book_detail(fixture.act_as("alice"), book).unwrap();
    assert_eq!(detail.summary.review_count, 0);
    assert_eq!(detail.summary.avg_rating, 0.0);
}

#[test]
fn test_only_readers_review() {
    let mut fixture = Fixture::new();
    let book = fixture.add_book("Dune", 1);
    let librarian = fixture.act_as("librarian");
    let err = catalog::review_book(librarian, book, 4, None).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

// Rust guideline compliant 2026-10-15

//! Shared fixture for service-level tests: a fresh library on disk with a
//! pinned clock and one signed-in account per role.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use libris_app::auth::{self, Registration};
use libris_app::catalog::{self, NewBook};
use libris_app::users::{self, NewUser};
use libris_app::{FixedClock, Library, RepoContext};
use libris_core::{Config, Role};
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;

pub const ADMIN: u64 = 1;
pub const LIBRARIAN: u64 = 2;
pub const ACCOUNTANT: u64 = 3;
pub const ALICE: u64 = 4;
pub const BOB: u64 = 5;

/// 09:00 UTC on the given day of January 2024.
pub fn jan(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0).unwrap()
}

pub struct Fixture {
    pub dir: TempDir,
    pub clock: Arc<FixedClock>,
    pub library: Library,
    tokens: HashMap<&'static str, String>,
}

impl Fixture {
    /// Admin, librarian, accountant and two readers, all signed in once.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let (repo, _) = RepoContext::init(dir.path()).unwrap();
        let config = Config {
            session_ttl_hours: 24 * 365,
            password_cost: 4,
            ..Config::default()
        };
        let clock = Arc::new(FixedClock::new(jan(10)));
        let library = Library::with_config(repo, config)
            .unwrap()
            .with_clock(clock.clone());

        let mut fixture = Self {
            dir,
            clock,
            library,
            tokens: HashMap::new(),
        };
        fixture.setup_accounts();
        fixture
    }

    fn setup_accounts(&mut self) {
        users::bootstrap_admin(&self.library, "Ada", "admin@lib.test", "admin-pw").unwrap();
        self.sign_in("admin", "admin@lib.test", "admin-pw");

        for (name, email, role) in [
            ("Lena", "librarian@lib.test", Role::Librarian),
            ("Carl", "accountant@lib.test", Role::Accountant),
        ] {
            users::create_user(
                &self.library,
                NewUser {
                    name: name.to_string(),
                    email: email.to_string(),
                    password: "staff-pw".to_string(),
                    role,
                    phone: None,
                },
            )
            .unwrap();
        }
        self.sign_in("librarian", "librarian@lib.test", "staff-pw");
        self.sign_in("accountant", "accountant@lib.test", "staff-pw");

        for (key, name) in [("alice", "Alice"), ("bob", "Bob")] {
            let email = format!("{key}@mail.test");
            auth::register(
                &self.library,
                Registration {
                    name: name.to_string(),
                    email: email.clone(),
                    password: "reader-pw".to_string(),
                    ..Registration::default()
                },
            )
            .unwrap();
            self.sign_in(key, &email, "reader-pw");
        }
    }

    fn sign_in(&mut self, key: &'static str, email: &str, password: &str) {
        let outcome = auth::login(&mut self.library, email, password).unwrap();
        self.tokens.insert(key, outcome.token);
    }

    /// Switches the acting session: `admin`, `librarian`, `accountant`,
    /// `alice` or `bob`.
    pub fn act_as(&mut self, key: &str) -> &Library {
        let token = self.tokens.get(key).cloned();
        assert!(token.is_some(), "unknown fixture account {key}");
        self.library.set_token(token);
        &self.library
    }

    /// Adds a book as admin and returns its id.
    pub fn add_book(&mut self, title: &str, copies: u32) -> u64 {
        let library = self.act_as("admin");
        catalog::add_book(
            library,
            NewBook {
                title: title.to_string(),
                author: format!("{title} Author"),
                genre: "Fiction".to_string(),
                total_copies: copies,
                ..NewBook::default()
            },
        )
        .unwrap()
        .id
    }

    /// Adds copies to a book as admin.
    pub fn add_copies(&mut self, book_id: u64, count: u32) {
        let library = self.act_as("admin");
        catalog::add_copies(library, book_id, count).unwrap();
    }

    pub fn ledger(&self) -> libris_core::Ledger {
        libris_core::Storage::new(self.library.repo().ledger_path().to_path_buf())
            .unwrap()
            .load_ledger()
            .unwrap()
    }
}

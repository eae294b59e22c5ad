// Rust guideline compliant 2026-10-16

//! End-to-end tests that drive the `libris` binary.

use serde_json::Value;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn libris(repo: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_libris"))
        .arg("--repo")
        .arg(repo)
        .args(args)
        .env_remove("LIBRIS_LOG")
        .env_remove("LIBRIS_OUTPUT_FORMAT")
        .env("LIBRIS_PASSWORD_COST", "4")
        .env("NO_COLOR", "1")
        .output()
        .expect("run libris")
}

/// Runs a command with `--json` and returns the `result` payload, failing
/// the test on a non-zero exit.
fn ok(repo: &Path, args: &[&str]) -> Value {
    let mut full = args.to_vec();
    full.push("--json");
    let output = libris(repo, &full);
    assert!(
        output.status.success(),
        "libris {:?} failed\nstdout: {}\nstderr: {}",
        args,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    let value: Value = serde_json::from_slice(&output.stdout).expect("JSON output");
    assert_eq!(value["status"], "ok");
    value["result"].clone()
}

/// Runs a command with `--json` that must fail and returns the envelope.
fn fails(repo: &Path, args: &[&str]) -> Value {
    let mut full = args.to_vec();
    full.push("--json");
    let output = libris(repo, &full);
    assert!(!output.status.success(), "libris {args:?} should fail");
    serde_json::from_slice(&output.stdout).expect("JSON error envelope")
}

fn login(repo: &Path, email: &str, password: &str) {
    ok(repo, &["auth", "login", "--email", email, "--password", password]);
}

fn seeded() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    let repo = dir.path();
    let init = ok(
        repo,
        &[
            "init",
            "--admin-email",
            "admin@lib.test",
            "--admin-password",
            "secret",
        ],
    );
    assert_eq!(init["created"], true);
    assert_eq!(init["admin"]["role"], "ADMIN");
    assert!(repo.join(".libris/library.jsonl").exists());
    assert!(repo.join(".libris/config.toml").exists());
    dir
}

#[test]
fn test_uninitialized_library_reports_envelope() {
    let dir = TempDir::new().expect("temp dir");
    let envelope = fails(dir.path(), &["auth", "whoami"]);
    assert_eq!(envelope["code"], "repo_not_initialized");
    assert_eq!(envelope["status"], 500);
}

#[test]
fn test_sessions_and_roles() {
    let dir = seeded();
    let repo = dir.path();

    let envelope = fails(repo, &["admin", "books", "list"]);
    assert_eq!(envelope["status"], 401);

    let envelope = fails(repo, &["auth", "login", "--email", "admin@lib.test", "--password", "nope"]);
    assert_eq!(envelope["status"], 401);

    login(repo, "admin@lib.test", "secret");
    assert_eq!(ok(repo, &["auth", "whoami"])["email"], "admin@lib.test");
    let envelope = fails(repo, &["reader", "reservations"]);
    assert_eq!(envelope["code"], "forbidden");
    assert_eq!(envelope["status"], 403);

    assert_eq!(ok(repo, &["auth", "logout"])["signed_out"], true);
    assert!(!repo.join(".libris/session.json").exists());
}

#[test]
fn test_order_flow_from_cart_to_completion() {
    let dir = seeded();
    let repo = dir.path();

    login(repo, "admin@lib.test", "secret");
    ok(
        repo,
        &[
            "admin", "users", "create", "--name", "Lena", "--email", "lena@lib.test",
            "--password", "pw", "--role", "librarian",
        ],
    );
    let book = ok(
        repo,
        &[
            "admin", "books", "add", "--title", "Dune", "--author", "Frank Herbert",
            "--genre", "SciFi", "--copies", "2",
        ],
    );
    assert_eq!(book["available_copies"], 2);
    let book_id = book["id"].as_u64().unwrap().to_string();

    ok(
        repo,
        &[
            "auth", "register", "--name", "Alice", "--email", "alice@mail.test",
            "--password", "pw",
        ],
    );
    login(repo, "alice@mail.test", "pw");
    let page = ok(repo, &["reader", "books", "list", "--search", "dune"]);
    assert_eq!(page["total"], 1);

    let cart = format!("{book_id}:2");
    let order = ok(repo, &["reader", "orders", "create", &cart, "--loan-days", "21"]);
    assert_eq!(order["status"], "PENDING");
    assert_eq!(order["loan_days"], 21);
    let order_id = order["id"].as_u64().unwrap().to_string();

    login(repo, "lena@lib.test", "pw");
    let envelope = fails(repo, &["librarian", "orders", "issue", &order_id]);
    assert_eq!(envelope["code"], "issue_rejected");

    assert_eq!(ok(repo, &["librarian", "orders", "approve", &order_id])["status"], "APPROVED");
    let issued = ok(repo, &["librarian", "orders", "issue", &order_id]);
    assert_eq!(issued["order"]["status"], "BORROWED");
    let loans = issued["borrowings"].as_array().unwrap().clone();
    assert_eq!(loans.len(), 2);

    let pending = ok(repo, &["librarian", "orders", "list", "--status", "borrowed"]);
    assert_eq!(pending.as_array().unwrap().len(), 1);

    for loan in &loans {
        let copy = loan["copy_id"].as_u64().unwrap().to_string();
        let returned = ok(repo, &["librarian", "return", &copy]);
        assert!(returned["fine"].is_null());
    }
    let completed = ok(repo, &["librarian", "orders", "list", "--status", "completed"]);
    assert_eq!(completed[0]["id"].as_u64().unwrap().to_string(), order_id);

    login(repo, "alice@mail.test", "pw");
    let paid = ok(repo, &["reader", "orders", "pay", &order_id]);
    assert_eq!(paid["outcome"], "paid");
    assert_eq!(ok(repo, &["reader", "orders", "pay", &order_id])["outcome"], "already_paid");
    let history = ok(repo, &["reader", "borrows"]);
    assert_eq!(history.as_array().unwrap().len(), 2);
}

#[test]
fn test_reservation_and_copy_marking() {
    let dir = seeded();
    let repo = dir.path();

    login(repo, "admin@lib.test", "secret");
    ok(
        repo,
        &[
            "admin", "users", "create", "--name", "Lena", "--email", "lena@lib.test",
            "--password", "pw", "--role", "LIBRARIAN",
        ],
    );
    let book = ok(
        repo,
        &["admin", "books", "add", "--title", "Emma", "--author", "Jane Austen", "--genre", "Classic", "--copies", "1"],
    );
    let book_id = book["id"].as_u64().unwrap().to_string();
    ok(repo, &["auth", "register", "--name", "Bob", "--email", "bob@mail.test", "--password", "pw"]);

    login(repo, "bob@mail.test", "pw");
    let hold = ok(repo, &["reader", "reserve", &book_id]);
    assert_eq!(hold["status"], "ACTIVE");
    let copy_id = hold["copy_id"].as_u64().unwrap().to_string();
    let envelope = fails(repo, &["reader", "reserve", &book_id]);
    assert_eq!(envelope["message"], "No available copy to reserve");

    login(repo, "lena@lib.test", "pw");
    let envelope = fails(repo, &["librarian", "mark-copy", &copy_id, "lost"]);
    assert_eq!(envelope["code"], "invalid_transition");

    login(repo, "bob@mail.test", "pw");
    let hold_id = hold["id"].as_u64().unwrap().to_string();
    assert_eq!(ok(repo, &["reader", "cancel-reservation", &hold_id])["cancelled"], true);

    login(repo, "lena@lib.test", "pw");
    let change = ok(repo, &["librarian", "mark-copy", &copy_id, "damaged"]);
    assert_eq!(change["to"], "DAMAGED");
    ok(repo, &["librarian", "mark-copy", &copy_id, "restore"]);
}

#[test]
fn test_profiles_reviews_and_reader_lookup() {
    let dir = seeded();
    let repo = dir.path();

    login(repo, "admin@lib.test", "secret");
    ok(
        repo,
        &[
            "admin", "users", "create", "--name", "Lena", "--email", "lena@lib.test",
            "--password", "pw", "--role", "LIBRARIAN",
        ],
    );
    let book = ok(
        repo,
        &["admin", "books", "add", "--title", "Emma", "--author", "Jane Austen", "--genre", "Classic", "--copies", "1"],
    );
    let book_id = book["id"].as_u64().unwrap().to_string();
    let bob = ok(repo, &["auth", "register", "--name", "Bob", "--email", "bob@mail.test", "--password", "pw"]);
    let bob_id = bob["id"].as_u64().unwrap().to_string();

    login(repo, "bob@mail.test", "pw");
    let profile = ok(
        repo,
        &["reader", "me", "update", "--phone", " 555-0100 ", "--birth-date", "1990-05-17"],
    );
    assert_eq!(profile["phone"], "555-0100");
    assert_eq!(profile["birth_date"], "1990-05-17");
    let envelope = fails(repo, &["reader", "me", "update", "--birth-date", "someday"]);
    assert_eq!(envelope["message"], "Invalid dob");
    assert_eq!(ok(repo, &["reader", "me", "show"])["name"], "Bob");

    let envelope = fails(repo, &["reader", "review", &book_id, "--rating", "6"]);
    assert_eq!(envelope["status"], 400);
    ok(repo, &["reader", "review", &book_id, "--rating", "2"]);
    let review = ok(repo, &["reader", "review", &book_id, "--rating", "4", "--comment", "witty"]);
    assert_eq!(review["rating"], 4);
    let detail = ok(repo, &["reader", "books", "show", &book_id]);
    assert_eq!(detail["review_count"], 1);
    assert_eq!(detail["avg_rating"], 4.0);
    assert_eq!(detail["reviews"][0]["reader_name"], "Bob");

    login(repo, "lena@lib.test", "pw");
    let found = ok(repo, &["librarian", "readers", "list", "--search", "BOB"]);
    assert_eq!(found.as_array().unwrap().len(), 1);
    let shown = ok(repo, &["librarian", "readers", "show", &bob_id]);
    assert_eq!(shown["profile"]["email"], "bob@mail.test");
    assert!(shown["borrowings"].as_array().unwrap().is_empty());
    let envelope = fails(repo, &["librarian", "readers", "show", "1"]);
    assert_eq!(envelope["status"], 404);
}

#[test]
fn test_oversized_loan_is_rejected() {
    let dir = seeded();
    let repo = dir.path();

    login(repo, "admin@lib.test", "secret");
    ok(
        repo,
        &[
            "admin", "users", "create", "--name", "Lena", "--email", "lena@lib.test",
            "--password", "pw", "--role", "LIBRARIAN",
        ],
    );
    ok(repo, &["admin", "books", "add", "--title", "Emma", "--author", "Jane Austen", "--genre", "Classic", "--copies", "1"]);
    let bob = ok(repo, &["auth", "register", "--name", "Bob", "--email", "bob@mail.test", "--password", "pw"]);
    let bob_id = bob["id"].as_u64().unwrap().to_string();

    login(repo, "lena@lib.test", "pw");
    let envelope = fails(
        repo,
        &["librarian", "borrow", "--reader", &bob_id, "--copy", "1", "--days", "4294967295"],
    );
    assert_eq!(envelope["code"], "invalid_input");
    assert_eq!(envelope["status"], 400);
}

#[test]
fn test_doctor_and_sweep() {
    let dir = seeded();
    let repo = dir.path();

    assert_eq!(ok(repo, &["doctor"])["healthy"], true);

    login(repo, "admin@lib.test", "secret");
    let swept = ok(repo, &["sweep"]);
    assert_eq!(swept["expired"].as_array().unwrap().len(), 0);

    let ledger = repo.join(".libris/library.jsonl");
    let mut content = std::fs::read_to_string(&ledger).unwrap();
    content.push_str("{broken\n");
    std::fs::write(&ledger, content).unwrap();
    let output = libris(repo, &["doctor", "--json"]);
    assert!(!output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["result"]["healthy"], false);
}

#[test]
fn test_table_output_is_default() {
    let dir = seeded();
    let repo = dir.path();
    login(repo, "admin@lib.test", "secret");

    let output = libris(repo, &["admin", "books", "list"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "No books found.");

    let output = libris(repo, &["admin", "users", "show", "999"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error: User not found"));
}

// Rust guideline compliant 2026-10-16

//! Libris CLI Application
//!
//! Command-line interface for the Libris lending engine.

use clap::Parser;
use libris_app::auth::Registration;
use libris_app::catalog::{BookSort, NewBook};
use libris_app::list::parse_role;
use libris_app::readers::ProfileUpdate;
use libris_app::users::{NewUser, UserUpdate};
use libris_app::{BrowseQuery, RepoContext};
use libris_cli::commands::{self, envelope_for, init::AdminSeed};
use libris_cli::{create_formatter, logging, should_use_color, terminal, Context};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "libris",
    version,
    about = "Libris: library lending engine",
    long_about = "Libris keeps a library's catalog, copies, holds, loans, orders, fines and payments in a local JSONL ledger. Sign in with 'libris auth login'; each command group requires its role.",
    after_help = "Examples:\n  libris init --admin-email admin@lib.test --admin-password secret\n  libris auth login --email admin@lib.test --password secret\n  libris admin books add --title Dune --author \"Frank Herbert\" --genre SciFi --copies 3\n  libris reader orders create 1:2 4 --loan-days 21\n  libris librarian orders issue-by-copies 7 --allocate 12:31 --allocate 13:40\n  libris accountant fines --status unpaid --json\n"
)]
struct Cli {
    /// Enable JSON output
    #[arg(long, global = true)]
    json: bool,

    /// Output format
    #[arg(long, value_enum, global = true)]
    format: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Library root directory (defaults to the current directory)
    #[arg(long, global = true)]
    repo: Option<PathBuf>,

    /// Log filter, e.g. `info` or `libris_app=debug` (overrides LIBRIS_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Table,
    Plain,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Initialize a new Libris library
    Init {
        /// Email of the first admin account
        #[arg(long, requires = "admin_password")]
        admin_email: Option<String>,

        /// Password of the first admin account
        #[arg(long, requires = "admin_email")]
        admin_password: Option<String>,

        /// Display name of the first admin account
        #[arg(long, default_value = "Administrator")]
        admin_name: String,
    },

    /// Expire lapsed reservations now (admin)
    Sweep,

    /// Run integrity checks
    Doctor,

    /// Register, sign in and out
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// Catalog and account administration
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },

    /// Circulation desk and order handling
    Librarian {
        #[command(subcommand)]
        action: LibrarianAction,
    },

    /// Browse, reserve, order and pay
    Reader {
        #[command(subcommand)]
        action: ReaderAction,
    },

    /// Fines and payments
    Accountant {
        #[command(subcommand)]
        action: AccountantAction,
    },
}

#[derive(Debug, clap::Subcommand)]
enum AuthAction {
    /// Create a reader account
    Register {
        /// Display name
        #[arg(long)]
        name: String,

        /// Login email
        #[arg(long)]
        email: String,

        /// Password
        #[arg(long)]
        password: String,

        /// Phone number
        #[arg(long)]
        phone: Option<String>,

        /// Postal address
        #[arg(long)]
        address: Option<String>,
    },

    /// Sign in and remember the session
    Login {
        /// Login email
        #[arg(long)]
        email: String,

        /// Password
        #[arg(long)]
        password: String,
    },

    /// End the saved session
    Logout,

    /// Show the signed-in account
    Whoami,
}

#[derive(Debug, clap::Subcommand)]
enum AdminAction {
    /// Manage books
    Books {
        #[command(subcommand)]
        action: AdminBooksAction,
    },

    /// Manage accounts
    Users {
        #[command(subcommand)]
        action: AdminUsersAction,
    },
}

#[derive(Debug, clap::Subcommand)]
enum AdminBooksAction {
    /// List all books with copy counts
    List,

    /// Add a book and its copies
    Add {
        /// Title
        #[arg(long)]
        title: String,

        /// Author
        #[arg(long)]
        author: String,

        /// Genre
        #[arg(long)]
        genre: String,

        /// Number of copies to create
        #[arg(long)]
        copies: u32,

        /// Language (default English)
        #[arg(long)]
        language: Option<String>,

        /// Publication year
        #[arg(long)]
        year: Option<i32>,

        /// Description
        #[arg(long)]
        description: Option<String>,

        /// Shelf location (default Shelf-A)
        #[arg(long)]
        location: Option<String>,
    },

    /// Add copies to a book
    AddCopies {
        /// Book ID
        id: u64,

        /// Number of copies to add
        #[arg(long, default_value_t = 1)]
        count: u32,
    },

    /// Delete a book with its copies and history
    Delete {
        /// Book ID
        id: u64,
    },
}

#[derive(Debug, clap::Subcommand)]
enum AdminUsersAction {
    /// List staff and reader accounts
    List,

    /// Show an account
    Show {
        /// User ID
        id: u64,
    },

    /// Create a staff or reader account
    Create {
        /// Display name
        #[arg(long)]
        name: String,

        /// Login email
        #[arg(long)]
        email: String,

        /// Password
        #[arg(long)]
        password: String,

        /// LIBRARIAN, ACCOUNTANT or READER
        #[arg(long)]
        role: String,

        /// Phone number
        #[arg(long)]
        phone: Option<String>,
    },

    /// Update an account
    Update {
        /// User ID
        id: u64,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New email
        #[arg(long)]
        email: Option<String>,

        /// New phone
        #[arg(long)]
        phone: Option<String>,

        /// New role
        #[arg(long)]
        role: Option<String>,

        /// New password
        #[arg(long)]
        password: Option<String>,
    },

    /// Delete an account
    Delete {
        /// User ID
        id: u64,
    },
}

#[derive(Debug, clap::Subcommand)]
enum LibrarianAction {
    /// Search the catalog
    Books {
        /// Title, author or genre substring
        #[arg(long)]
        search: Option<String>,
    },

    /// List shelf and lent copies
    Copies {
        /// Title or author substring
        #[arg(long)]
        search: Option<String>,
    },

    /// List copies of a book that can be issued
    IssueCandidates {
        /// Book ID
        book_id: u64,

        /// Include copies held for this reader
        #[arg(long)]
        reader: Option<u64>,
    },

    /// Lend a copy to a reader
    Borrow {
        /// Reader ID
        #[arg(long)]
        reader: u64,

        /// Copy ID
        #[arg(long)]
        copy: u64,

        /// Loan length in days
        #[arg(long)]
        days: Option<u32>,
    },

    /// Take a copy back
    Return {
        /// Copy ID
        copy_id: u64,
    },

    /// Mark a copy lost or damaged, or restore it
    MarkCopy {
        /// Copy ID
        copy_id: u64,

        /// lost, damaged or restore
        #[arg(value_parser = ["lost", "damaged", "restore", "available"])]
        action: String,
    },

    /// Handle borrow orders
    Orders {
        #[command(subcommand)]
        action: LibrarianOrdersAction,
    },

    /// Look up readers
    Readers {
        #[command(subcommand)]
        action: LibrarianReadersAction,
    },
}

#[derive(Debug, clap::Subcommand)]
enum LibrarianReadersAction {
    /// List readers
    List {
        /// Name or email substring
        #[arg(long)]
        search: Option<String>,
    },

    /// Show a reader with loans and fines
    Show {
        /// Reader ID
        id: u64,
    },
}

#[derive(Debug, clap::Subcommand)]
enum LibrarianOrdersAction {
    /// List orders
    List {
        /// Filter by status
        #[arg(long)]
        status: Option<String>,
    },

    /// Approve a pending order
    Approve {
        /// Order ID
        id: u64,
    },

    /// Issue an approved order with automatically chosen copies
    Issue {
        /// Order ID
        id: u64,
    },

    /// Issue an approved order with chosen copies
    IssueByCopies {
        /// Order ID
        id: u64,

        /// ITEM_ID:COPY_ID pairs
        #[arg(long = "allocate", required = true)]
        allocations: Vec<String>,
    },

    /// Cancel an order
    Cancel {
        /// Order ID
        id: u64,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ReaderAction {
    /// Browse the catalog
    Books {
        #[command(subcommand)]
        action: ReaderBooksAction,
    },

    /// Hold an available copy of a book
    Reserve {
        /// Book ID
        book_id: u64,

        /// Hold length in days
        #[arg(long)]
        hold_days: Option<u32>,
    },

    /// List your reservations
    Reservations,

    /// Cancel one of your reservations
    CancelReservation {
        /// Reservation ID
        id: u64,
    },

    /// Place and track borrow orders
    Orders {
        #[command(subcommand)]
        action: ReaderOrdersAction,
    },

    /// List your loans
    Borrows {
        /// Only loans not yet returned
        #[arg(long)]
        active: bool,
    },

    /// List your fines
    Fines,

    /// Pay one of your fines
    PayFine {
        /// Fine ID
        id: u64,
    },

    /// Rate a book from 1 to 5
    Review {
        /// Book ID
        book_id: u64,

        /// Rating, 1 to 5
        #[arg(long)]
        rating: u8,

        /// Comment
        #[arg(long)]
        comment: Option<String>,
    },

    /// View or edit your profile
    Me {
        #[command(subcommand)]
        action: ReaderMeAction,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ReaderMeAction {
    /// Show your profile
    Show,

    /// Update your profile; an empty value clears phone, gender or birth date
    Update {
        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Phone number
        #[arg(long)]
        phone: Option<String>,

        /// Postal address
        #[arg(long)]
        address: Option<String>,

        /// Gender
        #[arg(long)]
        gender: Option<String>,

        /// Date of birth, YYYY-MM-DD
        #[arg(long)]
        birth_date: Option<String>,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ReaderBooksAction {
    /// List books, one page at a time
    List {
        /// Title or author substring
        #[arg(long)]
        search: Option<String>,

        /// Genre
        #[arg(long)]
        genre: Option<String>,

        /// new or title
        #[arg(long, default_value = "new")]
        sort: String,

        /// Page number
        #[arg(long)]
        page: Option<u32>,

        /// Page size
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Show a book with its copies
    Show {
        /// Book ID
        id: u64,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ReaderOrdersAction {
    /// Place an order
    Create {
        /// BOOK_ID or BOOK_ID:QUANTITY
        #[arg(required = true)]
        items: Vec<String>,

        /// Loan length in days
        #[arg(long)]
        loan_days: Option<u32>,

        /// Note for the librarian
        #[arg(long)]
        note: Option<String>,
    },

    /// List your orders
    List,

    /// Show one of your orders
    Show {
        /// Order ID
        id: u64,
    },

    /// Pay for an order
    Pay {
        /// Order ID
        id: u64,

        /// Payment method
        #[arg(long)]
        method: Option<String>,
    },
}

#[derive(Debug, clap::Subcommand)]
enum AccountantAction {
    /// List fines
    Fines {
        /// all, paid or unpaid
        #[arg(long)]
        status: Option<String>,
    },

    /// Record payment of a fine
    PayFine {
        /// Fine ID
        id: u64,

        /// Payment method (default CASH)
        #[arg(long)]
        method: Option<String>,
    },

    /// List payments
    Payments,
}

fn resolve_format(cli: &Cli) -> &'static str {
    match cli.format {
        Some(OutputFormat::Json) => "json",
        Some(OutputFormat::Table) => "table",
        Some(OutputFormat::Plain) => "plain",
        None if cli.json => "json",
        None => RepoContext::discover(cli.repo.as_deref())
            .and_then(|repo| repo.load_config())
            .map(|config| match config.output_format {
                libris_core::OutputFormat::Json => "json",
                libris_core::OutputFormat::Table => "table",
                libris_core::OutputFormat::Plain => "plain",
            })
            .unwrap_or("table"),
    }
}

fn run_admin(ctx: &Context, action: AdminAction) -> anyhow::Result<()> {
    match action {
        AdminAction::Books { action } => match action {
            AdminBooksAction::List => commands::admin::books_list(ctx),
            AdminBooksAction::Add {
                title,
                author,
                genre,
                copies,
                language,
                year,
                description,
                location,
            } => commands::admin::books_add(
                ctx,
                NewBook {
                    title,
                    author,
                    genre,
                    total_copies: copies,
                    language,
                    published_year: year,
                    description,
                    location,
                },
            ),
            AdminBooksAction::AddCopies { id, count } => {
                commands::admin::books_add_copies(ctx, id, count)
            }
            AdminBooksAction::Delete { id } => commands::admin::books_delete(ctx, id),
        },
        AdminAction::Users { action } => match action {
            AdminUsersAction::List => commands::admin::users_list(ctx),
            AdminUsersAction::Show { id } => commands::admin::users_show(ctx, id),
            AdminUsersAction::Create {
                name,
                email,
                password,
                role,
                phone,
            } => commands::admin::users_create(
                ctx,
                NewUser {
                    name,
                    email,
                    password,
                    role: parse_role(&role)?,
                    phone,
                },
            ),
            AdminUsersAction::Update {
                id,
                name,
                email,
                phone,
                role,
                password,
            } => commands::admin::users_update(
                ctx,
                id,
                UserUpdate {
                    name,
                    email,
                    phone,
                    role: role.as_deref().map(parse_role).transpose()?,
                    password,
                },
            ),
            AdminUsersAction::Delete { id } => commands::admin::users_delete(ctx, id),
        },
    }
}

fn run_librarian(ctx: &Context, action: LibrarianAction) -> anyhow::Result<()> {
    use commands::librarian;

    match action {
        LibrarianAction::Books { search } => librarian::books(ctx, search.as_deref()),
        LibrarianAction::Copies { search } => librarian::copies(ctx, search.as_deref()),
        LibrarianAction::IssueCandidates { book_id, reader } => {
            librarian::issue_candidates(ctx, book_id, reader)
        }
        LibrarianAction::Borrow { reader, copy, days } => {
            librarian::borrow(ctx, reader, copy, days)
        }
        LibrarianAction::Return { copy_id } => librarian::return_copy(ctx, copy_id),
        LibrarianAction::MarkCopy { copy_id, action } => {
            librarian::mark_copy(ctx, copy_id, &action)
        }
        LibrarianAction::Orders { action } => match action {
            LibrarianOrdersAction::List { status } => {
                librarian::orders_list(ctx, status.as_deref())
            }
            LibrarianOrdersAction::Approve { id } => librarian::orders_approve(ctx, id),
            LibrarianOrdersAction::Issue { id } => librarian::orders_issue(ctx, id),
            LibrarianOrdersAction::IssueByCopies { id, allocations } => {
                librarian::orders_issue_by_copies(ctx, id, &allocations)
            }
            LibrarianOrdersAction::Cancel { id } => librarian::orders_cancel(ctx, id),
        },
        LibrarianAction::Readers { action } => match action {
            LibrarianReadersAction::List { search } => {
                librarian::readers_list(ctx, search.as_deref())
            }
            LibrarianReadersAction::Show { id } => librarian::readers_show(ctx, id),
        },
    }
}

fn run_reader(ctx: &Context, action: ReaderAction) -> anyhow::Result<()> {
    use commands::reader;

    match action {
        ReaderAction::Books { action } => match action {
            ReaderBooksAction::List {
                search,
                genre,
                sort,
                page,
                limit,
            } => {
                let query = BrowseQuery {
                    search,
                    genre,
                    sort: sort.parse::<BookSort>()?,
                    page,
                    limit,
                };
                reader::books_list(ctx, &query)
            }
            ReaderBooksAction::Show { id } => reader::books_show(ctx, id),
        },
        ReaderAction::Reserve { book_id, hold_days } => reader::reserve(ctx, book_id, hold_days),
        ReaderAction::Reservations => reader::reservations(ctx),
        ReaderAction::CancelReservation { id } => reader::cancel_reservation(ctx, id),
        ReaderAction::Orders { action } => match action {
            ReaderOrdersAction::Create {
                items,
                loan_days,
                note,
            } => reader::orders_create(ctx, &items, loan_days, note),
            ReaderOrdersAction::List => reader::orders_list(ctx),
            ReaderOrdersAction::Show { id } => reader::orders_show(ctx, id),
            ReaderOrdersAction::Pay { id, method } => {
                reader::orders_pay(ctx, id, method.as_deref())
            }
        },
        ReaderAction::Borrows { active } => reader::borrows(ctx, active),
        ReaderAction::Fines => reader::fines(ctx),
        ReaderAction::PayFine { id } => reader::pay_fine(ctx, id),
        ReaderAction::Review {
            book_id,
            rating,
            comment,
        } => reader::review(ctx, book_id, rating, comment.as_deref()),
        ReaderAction::Me { action } => match action {
            ReaderMeAction::Show => reader::profile_show(ctx),
            ReaderMeAction::Update {
                name,
                phone,
                address,
                gender,
                birth_date,
            } => reader::profile_update(
                ctx,
                ProfileUpdate {
                    name,
                    phone,
                    address,
                    gender,
                    birth_date,
                },
            ),
        },
    }
}

/// Runs one command; `Ok(false)` means it completed but reported a failure.
fn run(ctx: &Context, command: Commands) -> anyhow::Result<bool> {
    match command {
        Commands::Init {
            admin_email,
            admin_password,
            admin_name,
        } => {
            let admin = match (admin_email, admin_password) {
                (Some(email), Some(password)) => Some(AdminSeed {
                    name: admin_name,
                    email,
                    password,
                }),
                _ => None,
            };
            commands::init::execute(ctx, admin)?;
        }
        Commands::Sweep => commands::sweep::execute(ctx)?,
        Commands::Doctor => return commands::doctor::execute(ctx),
        Commands::Auth { action } => match action {
            AuthAction::Register {
                name,
                email,
                password,
                phone,
                address,
            } => commands::auth::register(
                ctx,
                Registration {
                    name,
                    email,
                    password,
                    phone,
                    address,
                },
            )?,
            AuthAction::Login { email, password } => {
                commands::auth::login(ctx, &email, &password)?;
            }
            AuthAction::Logout => commands::auth::logout(ctx)?,
            AuthAction::Whoami => commands::auth::whoami(ctx)?,
        },
        Commands::Admin { action } => run_admin(ctx, action)?,
        Commands::Librarian { action } => run_librarian(ctx, action)?,
        Commands::Reader { action } => run_reader(ctx, action)?,
        Commands::Accountant { action } => match action {
            AccountantAction::Fines { status } => {
                commands::accountant::fines(ctx, status.as_deref())?;
            }
            AccountantAction::PayFine { id, method } => {
                commands::accountant::pay_fine(ctx, id, method.as_deref())?;
            }
            AccountantAction::Payments => commands::accountant::payments(ctx)?,
        },
    }
    Ok(true)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _log_guard = match logging::init(cli.log_level.as_deref(), cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(err) => {
            terminal::print_error(&err.to_string());
            return ExitCode::FAILURE;
        }
    };

    let use_color = !cli.no_color && should_use_color();
    let formatter = create_formatter(resolve_format(&cli), use_color);
    let Cli { command, repo, .. } = cli;
    let ctx = Context::new(repo, formatter);

    let Some(command) = command else {
        println!("Use --help for usage information");
        return ExitCode::SUCCESS;
    };

    match run(&ctx, command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            let envelope = envelope_for(&err);
            if ctx.formatter().is_json() {
                println!("{}", ctx.formatter().format_error(&envelope));
            } else if use_color {
                terminal::print_error(&envelope.message);
            } else {
                eprintln!("{}", ctx.formatter().format_error(&envelope));
            }
            ExitCode::FAILURE
        }
    }
}

// Rust guideline compliant 2026-10-16

//! Libris CLI library.
//!
//! This library exposes the CLI modules for use in tests and external code.

pub mod commands;
pub mod logging;
pub mod output;
pub mod terminal;

pub use commands::Context;
pub use output::{create_formatter, Listing, Message, OutputFormatter, Record};
pub use terminal::{get_terminal_width, should_use_color, wrap_text};

// Rust guideline compliant 2026-10-16

//! Output formatting module for the Libris CLI.
//!
//! Commands describe their result once: a [`Listing`] of rows, a [`Record`]
//! of labelled fields or a short [`Message`], each carrying the JSON payload
//! for machine consumption. The formatter picks the rendering.

use chrono::{DateTime, Utc};
use libris_app::{ErrorEnvelope, SuccessEnvelope};
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt::Display;
use tabled::{builder::Builder, settings::Style};

use crate::terminal::wrap_text;

/// Rows of a list result.
#[derive(Debug, Clone)]
pub struct Listing {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
    empty: &'static str,
    json: Value,
}

impl Listing {
    /// Builds a listing from serializable items.
    ///
    /// # Arguments
    /// * `headers` - Column names for table output
    /// * `items` - The items, serialized as the JSON payload
    /// * `row` - Renders one item as cells matching `headers`
    ///
    /// # Errors
    /// Returns an error if the items cannot be serialized.
    pub fn new<T, F>(headers: &[&'static str], items: &[T], row: F) -> serde_json::Result<Self>
    where
        T: Serialize,
        F: Fn(&T) -> Vec<String>,
    {
        Ok(Self {
            headers: headers.to_vec(),
            rows: items.iter().map(row).collect(),
            empty: "Nothing found.",
            json: serde_json::to_value(items)?,
        })
    }

    /// Replaces the text shown for an empty listing.
    #[must_use]
    pub fn empty_text(mut self, text: &'static str) -> Self {
        self.empty = text;
        self
    }

    /// Replaces the JSON payload, e.g. to add paging metadata.
    #[must_use]
    pub fn with_json(mut self, json: Value) -> Self {
        self.json = json;
        self
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Labelled fields of a single result.
#[derive(Debug, Clone)]
pub struct Record {
    fields: Vec<(&'static str, String)>,
    json: Value,
}

impl Record {
    /// Starts a record whose JSON payload is `value`.
    ///
    /// # Errors
    /// Returns an error if the value cannot be serialized.
    pub fn new<T: Serialize>(value: &T) -> serde_json::Result<Self> {
        Ok(Self {
            fields: Vec::new(),
            json: serde_json::to_value(value)?,
        })
    }

    /// Adds a field.
    #[must_use]
    pub fn field(mut self, label: &'static str, value: impl Display) -> Self {
        self.fields.push((label, value.to_string()));
        self
    }

    /// Replaces the JSON payload.
    #[must_use]
    pub fn with_json(mut self, json: Value) -> Self {
        self.json = json;
        self
    }

    /// Adds a field only when it has a value.
    #[must_use]
    pub fn optional<V: Display>(self, label: &'static str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.field(label, value),
            None => self,
        }
    }
}

/// A one-line confirmation.
#[derive(Debug, Clone)]
pub struct Message {
    text: String,
    json: Value,
}

impl Message {
    /// Creates a message with an explicit JSON payload.
    #[must_use]
    pub fn new(text: impl Into<String>, json: Value) -> Self {
        Self {
            text: text.into(),
            json,
        }
    }
}

/// Output formatter trait.
///
/// Defines the interface for formatting command results in different output
/// formats.
pub trait OutputFormatter {
    /// Formats a list result.
    ///
    /// # Arguments
    /// * `listing` - The rows to format
    ///
    /// # Returns
    /// A formatted string representation of the list
    fn format_list(&self, listing: &Listing) -> String;

    /// Formats a single record.
    ///
    /// # Arguments
    /// * `record` - The record to format
    ///
    /// # Returns
    /// A formatted string representation of the record
    fn format_record(&self, record: &Record) -> String;

    /// Formats a confirmation message.
    fn format_message(&self, message: &Message) -> String;

    /// Formats an error for display.
    ///
    /// # Arguments
    /// * `error` - The error envelope to format
    ///
    /// # Returns
    /// A formatted error string
    fn format_error(&self, error: &ErrorEnvelope) -> String;

    /// True if this formatter emits machine-readable output.
    fn is_json(&self) -> bool {
        false
    }
}

fn pretty(value: &impl Serialize) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|_| json!({ "message": "Failed to serialize output" }).to_string())
}

/// JSON output formatter.
///
/// Wraps every result in the `{"status": "ok", "result": ...}` envelope.
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_list(&self, listing: &Listing) -> String {
        pretty(&SuccessEnvelope::new(&listing.json))
    }

    fn format_record(&self, record: &Record) -> String {
        pretty(&SuccessEnvelope::new(&record.json))
    }

    fn format_message(&self, message: &Message) -> String {
        pretty(&SuccessEnvelope::new(&message.json))
    }

    fn format_error(&self, error: &ErrorEnvelope) -> String {
        pretty(error)
    }

    fn is_json(&self) -> bool {
        true
    }
}

/// Table output formatter.
///
/// Formats results as human-readable tables and aligned fields.
pub struct TableFormatter {
    use_color: bool,
}

impl TableFormatter {
    /// Creates a new table formatter.
    ///
    /// # Arguments
    /// * `use_color` - Whether to use colored output
    ///
    /// # Returns
    /// A new TableFormatter instance
    #[must_use]
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    /// Whether errors should be colored.
    #[must_use]
    pub fn use_color(&self) -> bool {
        self.use_color
    }
}

impl OutputFormatter for TableFormatter {
    fn format_list(&self, listing: &Listing) -> String {
        if listing.rows.is_empty() {
            return listing.empty.to_string();
        }

        let mut builder = Builder::default();
        builder.push_record(listing.headers.iter().copied());
        for row in &listing.rows {
            builder.push_record(row.iter().map(String::as_str));
        }

        let mut table = builder.build();
        table.with(Style::modern());
        table.to_string()
    }

    fn format_record(&self, record: &Record) -> String {
        let width = record
            .fields
            .iter()
            .map(|(label, _)| label.len() + 1)
            .max()
            .unwrap_or(0);

        let mut output = String::new();
        for (label, value) in &record.fields {
            let label = format!("{label}:");
            let value = wrap_text(value, width + 1);
            output.push_str(&format!("{label:<width$} {value}\n"));
        }
        output
    }

    fn format_message(&self, message: &Message) -> String {
        message.text.clone()
    }

    fn format_error(&self, error: &ErrorEnvelope) -> String {
        format!("Error: {}", error.message)
    }
}

/// Plain text output formatter.
///
/// Tab-separated rows and `label: value` lines, for scripts and pipes.
pub struct PlainFormatter;

impl OutputFormatter for PlainFormatter {
    fn format_list(&self, listing: &Listing) -> String {
        if listing.rows.is_empty() {
            return listing.empty.to_string();
        }

        let mut output = String::new();
        for row in &listing.rows {
            output.push_str(&row.join("\t"));
            output.push('\n');
        }
        output
    }

    fn format_record(&self, record: &Record) -> String {
        let mut output = String::new();
        for (label, value) in &record.fields {
            output.push_str(&format!("{label}: {value}\n"));
        }
        output
    }

    fn format_message(&self, message: &Message) -> String {
        message.text.clone()
    }

    fn format_error(&self, error: &ErrorEnvelope) -> String {
        format!("Error: {}", error.message)
    }
}

/// Factory function to create an appropriate formatter.
///
/// # Arguments
/// * `format` - The desired output format ("json", "table", or "plain")
/// * `use_color` - Whether to use colored output (ignored for JSON)
///
/// # Returns
/// A boxed OutputFormatter instance
#[must_use]
pub fn create_formatter(format: &str, use_color: bool) -> Box<dyn OutputFormatter> {
    match format {
        "json" => Box::new(JsonFormatter),
        "plain" => Box::new(PlainFormatter),
        _ => Box::new(TableFormatter::new(use_color)),
    }
}

/// Renders a timestamp for humans.
#[must_use]
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

/// Renders an optional timestamp, `-` when absent.
#[must_use]
pub fn maybe_timestamp(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(|| "-".to_string(), timestamp)
}

/// Renders an optional value, `-` when absent.
#[must_use]
pub fn or_dash<V: Display>(value: Option<V>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Renders a yes/no flag.
#[must_use]
pub fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

// Rust guideline compliant 2026-10-16

//! Terminal helpers for the Libris CLI: color detection, width and
//! wrapping, and colored status lines on stderr.

use std::env;
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Fallback width when the terminal size is unknown.
pub const DEFAULT_WIDTH: usize = 80;

/// Determines if colored output should be used.
///
/// Respects the NO_COLOR environment variable and terminal capabilities.
///
/// # Returns
/// `true` if colored output should be used, `false` otherwise
#[must_use]
pub fn should_use_color() -> bool {
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }
    atty::is(atty::Stream::Stdout)
}

/// Gets the terminal width in columns.
///
/// # Returns
/// The terminal width, or [`DEFAULT_WIDTH`] if it cannot be determined
#[must_use]
pub fn get_terminal_width() -> usize {
    term_size::dimensions().map_or(DEFAULT_WIDTH, |(w, _)| w)
}

/// Wraps text to fit within the terminal width.
///
/// # Arguments
/// * `text` - The text to wrap
/// * `indent` - Columns already used on the first line; continuation lines
///   are indented by the same amount
///
/// # Returns
/// The wrapped text
#[must_use]
pub fn wrap_text(text: &str, indent: usize) -> String {
    wrap_to(text, indent, get_terminal_width())
}

fn wrap_to(text: &str, indent: usize, width: usize) -> String {
    let available = width.saturating_sub(indent);
    if available < 10 {
        return text.to_string();
    }

    let pad = " ".repeat(indent);
    let mut result = String::new();
    for (i, line) in text.lines().enumerate() {
        if i > 0 {
            result.push('\n');
            result.push_str(&pad);
        }
        if line.chars().count() <= available {
            result.push_str(line);
            continue;
        }

        let mut current = String::new();
        for word in line.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
            } else if current.chars().count() + 1 + word.chars().count() <= available {
                current.push(' ');
                current.push_str(word);
            } else {
                result.push_str(&current);
                result.push('\n');
                result.push_str(&pad);
                current = word.to_string();
            }
        }
        result.push_str(&current);
    }
    result
}

/// Prints a status message with a colored prefix to stderr.
///
/// # Arguments
/// * `prefix` - The prefix text
/// * `prefix_color` - The color for the prefix
/// * `message` - The message text
pub fn print_status(prefix: &str, prefix_color: Color, message: &str) {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(prefix_color)).set_bold(true));
    let _ = write!(stderr, "{prefix}: ");
    let _ = stderr.reset();
    let _ = writeln!(stderr, "{message}");
}

/// Prints an error line.
pub fn print_error(message: &str) {
    print_status("Error", Color::Red, message);
}

/// Prints a warning line.
pub fn print_warning(message: &str) {
    print_status("Warning", Color::Yellow, message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_terminal_width_returns_positive() {
        assert!(get_terminal_width() > 0);
    }

    #[test]
    fn test_short_text_is_untouched() {
        assert_eq!(wrap_to("short", 0, 80), "short");
    }

    #[test]
    fn test_long_line_wraps_with_indent() {
        let text = "the quick brown fox jumps over the lazy dog";
        let wrapped = wrap_to(text, 4, 24);
        let lines: Vec<&str> = wrapped.lines().collect();
        assert!(lines.len() > 1);
        assert!(lines[1..].iter().all(|l| l.starts_with("    ")));
        assert!(lines.iter().all(|l| l.trim_start().chars().count() <= 20));
        assert_eq!(
            wrapped.split_whitespace().collect::<Vec<_>>().join(" "),
            text
        );
    }

    #[test]
    fn test_narrow_terminal_disables_wrapping() {
        let text = "no room to wrap anything here";
        assert_eq!(wrap_to(text, 75, 80), text);
    }
}

//! Styling for terminal output.
//!
//! ## stdout vs stderr
//!
//! - **stdout**: the cd target, list tables, JSON, completion candidates, shell scripts
//! - **stderr**: everything else (progress, success, warnings, errors, hook output)
//!
//! The shell wrapper relies on this split, so status messages must never go to stdout.

mod constants;

// Re-exports from anstream (auto-detecting output)
pub use anstream::{eprint, eprintln, print, println, stderr, stdout};

pub use constants::*;

use unicode_width::UnicodeWidthStr;

/// Display width of a string, ignoring ANSI escape sequences.
pub fn visible_width(s: &str) -> usize {
    use ansi_str::AnsiStr;
    s.ansi_strip().width()
}

/// Pad `s` on the right to `width` visible columns.
pub fn pad_visible(s: &str, width: usize) -> String {
    let pad = width.saturating_sub(visible_width(s));
    format!("{s}{}", " ".repeat(pad))
}

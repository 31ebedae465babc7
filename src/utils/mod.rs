//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application.

pub mod error;

/// Keep at most `max_chars` characters of `text`.
///
/// Counts Unicode scalar values, so multi-byte text is never split inside a
/// character.
pub fn take_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Percent-encode a page title the way encyclopedia page URLs expect:
/// spaces become underscores and `/` stays literal.
pub fn encode_page_title(title: &str) -> String {
    urlencoding::encode(&title.replace(' ', "_")).replace("%2F", "/")
}

//! Text sanitization utilities for feed and page text
//!
//! Feed summaries arrive as plain text, escaped HTML or raw HTML depending on
//! the publisher. These helpers back the `unEscapeHTML` and `unHTML`
//! extensions and the whitespace cleanup applied to every summary.

use regex::Regex;
use std::sync::LazyLock;

// Pre-compiled regex patterns for performance
static WHITESPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex pattern"));

static TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Invalid regex pattern"));

static SCRIPT_STYLE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>").expect("Invalid regex pattern")
});

static BLOCK_BREAK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<\s*(br|/p|/div|/li|/h[1-6])\b[^>]*>").expect("Invalid regex pattern")
});

/// Remove zero-width spaces and similar invisible characters
///
/// # Examples
///
/// ```
/// use sluice::parser::sanitize::remove_zero_width;
///
/// let text = "日\u{200B}本\u{FEFF}語";
/// assert_eq!(remove_zero_width(text), "日本語");
/// ```
pub fn remove_zero_width(text: &str) -> String {
    text.chars()
        .filter(|c| {
            !matches!(*c,
                '\u{200B}'..='\u{200F}' |
                '\u{2028}'..='\u{202F}' |
                '\u{FEFF}'
            )
        })
        .collect()
}

/// Remove control characters except newline and tab
pub fn remove_control_chars(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// Decode HTML entities (named and numeric) to plain text
///
/// # Examples
///
/// ```
/// use sluice::parser::sanitize::decode_html_entities;
///
/// let text = "&lt;p&gt;Tom &amp; Jerry&#x27;s&lt;/p&gt;";
/// assert_eq!(decode_html_entities(text), "<p>Tom & Jerry's</p>");
/// ```
pub fn decode_html_entities(text: &str) -> String {
    html_escape::decode_html_entities(text)
        .replace('\u{a0}', " ")
}

/// Extract plain text from HTML, removing all tags
///
/// Script and style bodies are dropped entirely; line-breaking tags become
/// spaces so adjacent paragraphs do not run together.
///
/// # Examples
///
/// ```
/// use sluice::parser::sanitize::strip_html_tags;
///
/// let html = "<p>Hello <strong>World</strong></p><p>again</p>";
/// assert_eq!(strip_html_tags(html), "Hello World again");
/// ```
pub fn strip_html_tags(html: &str) -> String {
    let without_code = SCRIPT_STYLE_REGEX.replace_all(html, " ");
    let with_breaks = BLOCK_BREAK_REGEX.replace_all(&without_code, " ");
    let stripped = TAG_REGEX.replace_all(&with_breaks, "");
    collapse_whitespace(&stripped)
}

/// Collapse all whitespace runs (including newlines) to single spaces
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_REGEX.replace_all(text.trim(), " ").to_string()
}

/// Baseline cleanup applied to every summary
///
/// Removes invisible and control characters and trims the ends, but keeps
/// markup and entities untouched; those are the extensions' business.
pub fn clean_text(text: &str) -> String {
    remove_control_chars(&remove_zero_width(text)).trim().to_string()
}

/// Check if text contains meaningful content
pub fn has_content(text: &str) -> bool {
    !text.trim().is_empty()
}

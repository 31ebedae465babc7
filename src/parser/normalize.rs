//! Raw content to [`NormalizedDocument`]
//!
//! Pure: no I/O, no clock. Missing links and empty extracts are routine in
//! upstream data, so they yield `None` instead of an error.

use crate::models::{FeedEntry, NormalizedDocument, PageSummary, RawContent, Source, DEFAULT_WIKI_TAGS};
use crate::parser::extensions::Extension;
use crate::parser::sanitize::{clean_text, has_content};
use crate::utils::take_chars;

/// Extracts a bounded title/summary pair from fetched content
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    summary_max: usize,
}

impl Normalizer {
    /// Create a normalizer capping summaries at `summary_max` characters
    pub fn new(summary_max: usize) -> Self {
        Self { summary_max }
    }

    /// Maximum summary length in characters
    pub fn summary_max(&self) -> usize {
        self.summary_max
    }

    /// Normalize with no extensions applied
    pub fn normalize(&self, raw: &RawContent<'_>) -> Option<NormalizedDocument> {
        self.normalize_with(raw, &[])
    }

    /// Normalize, running `extensions` in order before the summary is capped
    pub fn normalize_with(
        &self,
        raw: &RawContent<'_>,
        extensions: &[Extension],
    ) -> Option<NormalizedDocument> {
        let mut doc = match raw {
            RawContent::Feed { source, entry } => extract_feed_entry(source, entry)?,
            RawContent::Page {
                title,
                fallback_url,
                summary,
            } => extract_page(title, fallback_url, summary)?,
        };

        for ext in extensions {
            ext.apply(&mut doc);
        }

        doc.summary = take_chars(doc.summary.trim(), self.summary_max).to_string();
        Some(doc)
    }
}

fn extract_feed_entry(source: &Source, entry: &FeedEntry) -> Option<NormalizedDocument> {
    let url = entry
        .link
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .or_else(|| entry.id.as_deref().map(str::trim).filter(|id| is_http_url(id)))?
        .to_string();

    let title = entry
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(&url)
        .to_string();

    // A present-but-empty summary does not fall through to the content.
    let summary = match (&entry.summary, entry.content.first()) {
        (Some(summary), _) => clean_text(summary),
        (None, Some(content)) => clean_text(content),
        (None, None) => String::new(),
    };

    Some(NormalizedDocument {
        url,
        title: Some(title),
        summary,
        tags: source.effective_tags(),
    })
}

fn extract_page(requested: &str, fallback_url: &str, summary: &PageSummary) -> Option<NormalizedDocument> {
    let extract = clean_text(summary.extract.as_deref()?);
    if !has_content(&extract) {
        return None;
    }

    let url = Some(fallback_url.trim())
        .filter(|u| !u.is_empty())
        .or_else(|| summary.canonical_url())?
        .to_string();

    let title = summary
        .title
        .as_deref()
        .or(Some(requested))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(&url)
        .to_string();

    Some(NormalizedDocument {
        url,
        title: Some(title),
        summary: extract,
        tags: DEFAULT_WIKI_TAGS.iter().map(|t| t.to_string()).collect(),
    })
}

fn is_http_url(value: &str) -> bool {
    url::Url::parse(value)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

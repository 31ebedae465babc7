// Core data structures for the sluice harvester

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tags used when a feed source declares none
pub const DEFAULT_FEED_TAGS: &[&str] = &["news"];

/// Tags attached to every encyclopedia page
pub const DEFAULT_WIKI_TAGS: &[&str] = &["wiki"];

/// A configured feed
///
/// Loaded once at startup from the catalog and never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Post-processing hints such as `unHTML`; opaque to the core
    #[serde(default)]
    pub plugins: Vec<String>,
}

impl Source {
    /// Create a source with no icon, tags or plugins
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            icon: None,
            tags: Vec::new(),
            plugins: Vec::new(),
        }
    }

    /// Builder-style tag setter
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style plugin setter
    pub fn with_plugins<I, S>(mut self, plugins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.plugins = plugins.into_iter().map(Into::into).collect();
        self
    }

    /// Declared tags, or the default feed tags when none are declared
    pub fn effective_tags(&self) -> Vec<String> {
        if self.tags.is_empty() {
            DEFAULT_FEED_TAGS.iter().map(|t| t.to_string()).collect()
        } else {
            self.tags.clone()
        }
    }
}

/// One entry of a parsed feed document
///
/// Every field is optional; feeds in the wild omit any of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    /// Stable identifier (`guid`, Atom `id`)
    pub id: Option<String>,
    /// Primary summary field (`description`, Atom `summary`)
    pub summary: Option<String>,
    /// Alternate content representations (`content:encoded`, Atom `content`)
    pub content: Vec<String>,
}

/// Page summary record returned by the encyclopedia REST API
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageSummary {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub extract: Option<String>,
    #[serde(default)]
    pub content_urls: Option<ContentUrls>,
}

/// Canonical URLs of a page
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContentUrls {
    #[serde(default)]
    pub desktop: Option<PageUrls>,
}

/// URLs for one rendering of a page
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageUrls {
    #[serde(default)]
    pub page: Option<String>,
}

impl PageSummary {
    /// Desktop page URL reported by the API, if any
    pub fn canonical_url(&self) -> Option<&str> {
        self.content_urls
            .as_ref()
            .and_then(|c| c.desktop.as_ref())
            .and_then(|d| d.page.as_deref())
            .filter(|u| !u.trim().is_empty())
    }
}

/// Retrieved content paired with where it came from, ready for normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawContent<'a> {
    /// A feed entry together with the source it came from
    Feed {
        source: &'a Source,
        entry: &'a FeedEntry,
    },
    /// An encyclopedia page summary
    Page {
        /// Title the page was requested under
        title: &'a str,
        /// Page URL built from the requested title
        fallback_url: &'a str,
        summary: &'a PageSummary,
    },
}

/// Document ready for submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedDocument {
    pub url: String,
    pub title: Option<String>,
    /// Summary text, already capped to the configured length
    pub summary: String,
    pub tags: Vec<String>,
}

impl NormalizedDocument {
    /// Title for log lines, cut to `max_chars`
    pub fn short_title(&self, max_chars: usize) -> &str {
        let title = self.title.as_deref().unwrap_or(&self.url);
        crate::utils::take_chars(title, max_chars)
    }
}

/// Outcome of one work item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Index accepted the document
    Submitted,
    /// Index answered with status >= 300
    Rejected,
    /// Normalization produced nothing
    Skipped,
    /// Fetch or submit transport failure
    Failed,
}

/// Per-cycle statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleStats {
    pub processed: u32,
    pub submitted: u32,
    pub rejected: u32,
    pub skipped: u32,
    pub failed: u32,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl CycleStats {
    /// Record the outcome of one item
    pub fn record(&mut self, outcome: ItemOutcome) {
        self.processed += 1;
        match outcome {
            ItemOutcome::Submitted => self.submitted += 1,
            ItemOutcome::Rejected => self.rejected += 1,
            ItemOutcome::Skipped => self.skipped += 1,
            ItemOutcome::Failed => self.failed += 1,
        }
    }

    /// Fold another set of statistics into this one
    pub fn merge(&mut self, other: &CycleStats) {
        self.processed += other.processed;
        self.submitted += other.submitted;
        self.rejected += other.rejected;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }

    /// Failure rate as percentage
    pub fn error_rate(&self) -> f64 {
        if self.processed == 0 {
            0.0
        } else {
            ((self.rejected + self.failed) as f64 / self.processed as f64) * 100.0
        }
    }
}

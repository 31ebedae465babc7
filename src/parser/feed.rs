//! Feed document parsing
//!
//! Turns a decoded feed document into [`FeedEntry`] values. RSS 0.9x, 1.0
//! (RDF) and 2.0 go through the [`rss`] crate; Atom is read with a small
//! serde model over `quick-xml`. Parsing is pure, so tests never touch the
//! network.

use regex::Regex;
use serde::Deserialize;
use std::borrow::Cow;
use std::sync::LazyLock;

use crate::models::FeedEntry;
use crate::utils::error::FetchError;

static DECLARATION_ENCODING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(\s*<\?xml[^>]*?encoding\s*=\s*["'])[^"']*(["'])"#).expect("Invalid regex pattern")
});

/// Parse a feed document in any supported format
///
/// # Errors
///
/// Returns `FetchError::Feed` when the document is neither RSS nor Atom.
pub fn parse_feed(text: &str) -> Result<Vec<FeedEntry>, FetchError> {
    // The text is already UTF-8; a stale declaration would make the XML
    // reader decode it a second time.
    let text = utf8_declaration(text);

    let rss_err = match rss::Channel::read_from(text.as_bytes()) {
        Ok(channel) => return Ok(entries_from_channel(&channel)),
        Err(e) => e,
    };

    match quick_xml::de::from_str::<AtomFeed>(&text) {
        Ok(feed) if feed.is_atom() => Ok(feed.entries.into_iter().map(FeedEntry::from).collect()),
        Ok(_) => Err(FetchError::Feed(format!("not a feed document: {rss_err}"))),
        Err(atom_err) => Err(FetchError::Feed(format!(
            "not RSS ({rss_err}) nor Atom ({atom_err})"
        ))),
    }
}

fn utf8_declaration(text: &str) -> Cow<'_, str> {
    let text = text.trim_start_matches('\u{FEFF}');
    DECLARATION_ENCODING.replace(text, "${1}UTF-8${2}")
}

fn entries_from_channel(channel: &rss::Channel) -> Vec<FeedEntry> {
    channel
        .items()
        .iter()
        .map(|item| FeedEntry {
            title: non_blank(item.title()),
            link: non_blank(item.link()),
            id: non_blank(item.guid().map(|g| g.value())),
            summary: item.description().map(str::to_string),
            content: item.content().map(str::to_string).into_iter().collect(),
        })
        .collect()
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// ============================================================================
// Atom
// ============================================================================

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "@xmlns", default)]
    xmlns: Option<String>,

    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

impl AtomFeed {
    fn is_atom(&self) -> bool {
        self.xmlns
            .as_deref()
            .map(|ns| ns.contains("Atom"))
            .unwrap_or(!self.entries.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    #[serde(default)]
    title: Option<AtomText>,

    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,

    #[serde(default)]
    id: Option<String>,

    #[serde(default)]
    summary: Option<AtomText>,

    #[serde(rename = "content", default)]
    contents: Vec<AtomText>,
}

#[derive(Debug, Deserialize)]
struct AtomText {
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href", default)]
    href: Option<String>,

    #[serde(rename = "@rel", default)]
    rel: Option<String>,
}

impl AtomEntry {
    /// `rel="alternate"` (or no rel) wins; otherwise the first link with an href
    fn best_link(&self) -> Option<&str> {
        let with_href = || self.links.iter().filter(|l| l.href.is_some());
        with_href()
            .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
            .or_else(|| with_href().next())
            .and_then(|l| l.href.as_deref())
    }
}

impl From<AtomEntry> for FeedEntry {
    fn from(entry: AtomEntry) -> Self {
        let link = non_blank(entry.best_link());
        Self {
            title: non_blank(entry.title.as_ref().map(|t| t.value.as_str())),
            link,
            id: non_blank(entry.id.as_deref()),
            summary: entry.summary.map(|s| s.value),
            content: entry.contents.into_iter().map(|c| c.value).collect(),
        }
    }
}

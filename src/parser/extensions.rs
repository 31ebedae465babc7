//! Optional post-processing selected by a source's plugin hints
//!
//! The core normalizer never depends on these; a source with no hints, or
//! with hints this build does not know, is normalized exactly the same way.

use std::fmt;
use std::str::FromStr;

use crate::models::NormalizedDocument;
use crate::parser::sanitize::{collapse_whitespace, decode_html_entities, strip_html_tags};

/// A text transformation applied after extraction and before truncation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extension {
    /// `unEscapeHTML`: decode HTML entities in title and summary
    UnescapeHtml,
    /// `unHTML`: strip markup from title and summary
    StripHtml,
    /// `cleanAllURLParams`: drop query string and fragment from the URL
    CleanUrlParams,
}

impl Extension {
    /// Hint spelling used in the catalog
    pub fn hint(&self) -> &'static str {
        match self {
            Self::UnescapeHtml => "unEscapeHTML",
            Self::StripHtml => "unHTML",
            Self::CleanUrlParams => "cleanAllURLParams",
        }
    }

    /// Resolve a list of hints, keeping their order and dropping unknown ones
    pub fn from_hints<S: AsRef<str>>(hints: &[S]) -> Vec<Self> {
        hints
            .iter()
            .filter_map(|hint| match hint.as_ref().parse() {
                Ok(ext) => Some(ext),
                Err(UnknownExtension(name)) => {
                    tracing::debug!(hint = %name, "Ignoring unknown plugin hint");
                    None
                }
            })
            .collect()
    }

    /// Apply this extension to a document in place
    pub fn apply(&self, doc: &mut NormalizedDocument) {
        match self {
            Self::UnescapeHtml => {
                doc.summary = decode_html_entities(&doc.summary);
                if let Some(title) = doc.title.as_mut() {
                    *title = decode_html_entities(title);
                }
            }
            Self::StripHtml => {
                doc.summary = strip_html_tags(&doc.summary);
                if let Some(title) = doc.title.as_mut() {
                    *title = collapse_whitespace(&strip_html_tags(title));
                }
            }
            Self::CleanUrlParams => {
                if let Ok(mut url) = url::Url::parse(&doc.url) {
                    url.set_query(None);
                    url.set_fragment(None);
                    doc.url = url.to_string();
                }
            }
        }
    }
}

/// A plugin hint this build does not implement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownExtension(pub String);

impl fmt::Display for UnknownExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown plugin hint: {}", self.0)
    }
}

impl std::error::Error for UnknownExtension {}

impl FromStr for Extension {
    type Err = UnknownExtension;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "unEscapeHTML" => Ok(Self::UnescapeHtml),
            "unHTML" => Ok(Self::StripHtml),
            "cleanAllURLParams" => Ok(Self::CleanUrlParams),
            other => Err(UnknownExtension(other.to_string())),
        }
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(url: &str, title: &str, summary: &str) -> NormalizedDocument {
        NormalizedDocument {
            url: url.to_string(),
            title: Some(title.to_string()),
            summary: summary.to_string(),
            tags: vec![String::from("news")],
        }
    }

    #[test]
    fn test_from_hints_keeps_order_and_drops_unknown() {
        let exts = Extension::from_hints(&["unEscapeHTML", "linuxReleaseID", "unHTML"]);
        assert_eq!(exts, vec![Extension::UnescapeHtml, Extension::StripHtml]);

        let none: Vec<Extension> = Extension::from_hints::<&str>(&[]);
        assert!(none.is_empty());
    }

    #[test]
    fn test_unescape_then_strip() {
        let mut d = doc(
            "https://example.com/a",
            "A &amp; B",
            "&lt;p&gt;Escaped &lt;b&gt;markup&lt;/b&gt;&lt;/p&gt;",
        );
        for ext in Extension::from_hints(&["unEscapeHTML", "unHTML"]) {
            ext.apply(&mut d);
        }
        assert_eq!(d.title.as_deref(), Some("A & B"));
        assert_eq!(d.summary, "Escaped markup");
    }

    #[test]
    fn test_clean_url_params() {
        let mut d = doc("https://jp.yna.co.kr/view/AJP1?section=news#top", "t", "s");
        Extension::CleanUrlParams.apply(&mut d);
        assert_eq!(d.url, "https://jp.yna.co.kr/view/AJP1");
    }

    #[test]
    fn test_clean_url_params_leaves_unparseable_url() {
        let mut d = doc("not a url?x=1", "t", "s");
        Extension::CleanUrlParams.apply(&mut d);
        assert_eq!(d.url, "not a url?x=1");
    }

    #[test]
    fn test_hint_round_trip() {
        for ext in [
            Extension::UnescapeHtml,
            Extension::StripHtml,
            Extension::CleanUrlParams,
        ] {
            assert_eq!(ext.hint().parse::<Extension>(), Ok(ext));
        }
        assert!("bogus".parse::<Extension>().is_err());
    }
}

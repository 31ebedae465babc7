//! Feed source catalog
//!
//! A read-only list of [`Source`] descriptors loaded once at startup. The
//! catalog is a TOML document of `[[source]]` tables:
//!
//! ```toml
//! [[source]]
//! name = "Example"
//! url = "https://example.com/feed.xml"
//! icon = "https://example.com/icon.png"   # optional
//! tags = ["news", "blog"]                 # optional, defaults to ["news"]
//! plugins = ["unHTML"]                    # optional
//! ```
//!
//! A catalog ships with the binary; a file path overrides it.

use serde::Deserialize;
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::Source;

/// Catalog bundled with the binary
const BUNDLED: &str = include_str!("sources.toml");

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    source: Vec<Source>,
}

/// Ordered, immutable list of feed sources
#[derive(Debug, Clone, Default)]
pub struct SourceCatalog {
    sources: Vec<Source>,
}

impl SourceCatalog {
    /// Build a catalog from already validated sources
    pub fn new(sources: Vec<Source>) -> Self {
        Self { sources }
    }

    /// The catalog bundled with the binary
    pub fn bundled() -> Result<Self> {
        Self::from_toml(BUNDLED)
    }

    /// Load a catalog file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
            .map_err(|e| Error::config(format!("{}: {e}", path.display())))
    }

    /// Load from `path` if given, the bundled catalog otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::bundled(),
        }
    }

    /// Parse and validate a catalog document
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)?;

        for (i, source) in file.source.iter().enumerate() {
            validate_source(source).map_err(|msg| Error::config(format!("source #{}: {msg}", i + 1)))?;
        }

        Ok(Self::new(file.source))
    }

    /// Number of sources
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Sources in catalog order
    pub fn iter(&self) -> std::slice::Iter<'_, Source> {
        self.sources.iter()
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }
}

impl<'a> IntoIterator for &'a SourceCatalog {
    type Item = &'a Source;
    type IntoIter = std::slice::Iter<'a, Source>;

    fn into_iter(self) -> Self::IntoIter {
        self.sources.iter()
    }
}

fn validate_source(source: &Source) -> std::result::Result<(), String> {
    if source.name.trim().is_empty() {
        return Err(String::from("name must not be empty"));
    }

    let url = url::Url::parse(&source.url).map_err(|e| format!("invalid url {:?}: {e}", source.url))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("url must be http(s): {}", source.url));
    }

    Ok(())
}

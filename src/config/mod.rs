//! Configuration management for the sluice harvester
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files. Unparseable values fail fast at startup instead
//! of silently falling back to defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Default indexing endpoint
pub const DEFAULT_ENDPOINT: &str = "https://dev.371tti.net/api/index";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Outbound HTTP settings shared by every request
    pub http: HttpConfig,

    /// Downstream indexing endpoint
    pub index: IndexConfig,

    /// Feed harvesting
    pub feeds: FeedsConfig,

    /// Encyclopedia harvesting
    pub wiki: WikiConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Minimum spacing between any two requests, in seconds
    pub request_interval_secs: f64,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// User agent string
    pub user_agent: String,
}

/// Indexing endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// URL that receives one POST per document
    pub endpoint: String,
}

/// Feed harvesting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedsConfig {
    /// Sleep after a full pass over every feed, in seconds
    pub cycle_sleep_secs: f64,

    /// Only the first N entries of each feed are submitted
    pub max_entries_per_feed: usize,

    /// Maximum summary length in characters
    pub summary_max: usize,

    /// Optional catalog file replacing the bundled source list
    pub catalog_path: Option<PathBuf>,
}

/// Per-cycle batch composition for encyclopedia harvesting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Titles taken from the featured-article rotation
    pub featured: usize,

    /// Titles taken from the good-article rotation
    pub good: usize,

    /// Titles drained from the top-viewed cache
    pub topview: usize,

    /// Upper bound on random titles requested per cycle
    pub random: usize,

    /// Target batch size; random titles top the batch up to this
    pub max: usize,
}

/// Encyclopedia harvesting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WikiConfig {
    /// Language edition (subdomain), e.g. `ja`
    pub lang: String,

    /// Category holding featured articles
    pub featured_category: String,

    /// Category holding good articles
    pub good_category: String,

    /// Upper bound on titles loaded from each category
    pub category_limit: usize,

    /// Batch composition
    pub batch: BatchConfig,

    /// Sleep after each cycle, in seconds
    pub cycle_sleep_secs: f64,

    /// Maximum summary length in characters
    pub summary_max: usize,

    /// Lifetime of the top-viewed snapshot, in seconds
    pub topview_ttl_secs: u64,

    /// Base URL override for the language edition (tests, mirrors)
    pub site_base: Option<String>,

    /// Base URL override for the page-view ranking API
    pub metrics_base: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_interval_secs: 0.1,
            request_timeout_secs: 30,
            user_agent: default_user_agent(),
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            endpoint: String::from(DEFAULT_ENDPOINT),
        }
    }
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            cycle_sleep_secs: 600.0,
            max_entries_per_feed: 8,
            summary_max: 400,
            catalog_path: None,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            featured: 0,
            good: 0,
            topview: 0,
            random: 24,
            max: 24,
        }
    }
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            lang: String::from("ja"),
            featured_category: String::from("秀逸な記事"),
            good_category: String::from("良質な記事"),
            category_limit: 10_000,
            batch: BatchConfig::default(),
            cycle_sleep_secs: 1.0,
            summary_max: 800,
            topview_ttl_secs: 3600,
            site_base: None,
            metrics_base: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

fn default_user_agent() -> String {
    format!("sluice/{} (+https://example.com)", env!("CARGO_PKG_VERSION"))
}

/// Read and parse an environment variable, failing on unparseable values
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("Invalid value for {key}: {raw:?}")),
        Err(_) => Ok(None),
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load configuration from environment variables on top of defaults
    pub fn from_env() -> Result<Self> {
        Self::default().merge_env()
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        config.merge_env()
    }

    /// Overlay environment variables onto this configuration
    pub fn merge_env(mut self) -> Result<Self> {
        if let Some(endpoint) = env_string("ADD_ENDPOINT").or_else(|| env_string("SEARCH_ADD_ENDPOINT")) {
            self.index.endpoint = endpoint;
        }
        if let Some(v) = env_parse("REQ_INTERVAL")? {
            self.http.request_interval_secs = v;
        }
        if let Some(v) = env_parse("REQUEST_TIMEOUT")? {
            self.http.request_timeout_secs = v;
        }
        if let Some(v) = env_string("SLUICE_USER_AGENT") {
            self.http.user_agent = v;
        }

        if let Some(v) = env_parse("FETCH_INTERVAL")? {
            self.feeds.cycle_sleep_secs = v;
        }
        if let Some(v) = env_parse("MAX_ENTRIES_PER_FEED")? {
            self.feeds.max_entries_per_feed = v;
        }
        if let Some(v) = env_parse::<usize>("SUMMARY_MAX")? {
            self.feeds.summary_max = v;
            self.wiki.summary_max = v;
        }
        if let Some(v) = env_string("SLUICE_SOURCES") {
            self.feeds.catalog_path = Some(PathBuf::from(v));
        }

        if let Some(v) = env_string("WIKI_LANG") {
            self.wiki.lang = v;
        }
        if let Some(v) = env_parse("BATCH_FEATURED")? {
            self.wiki.batch.featured = v;
        }
        if let Some(v) = env_parse("BATCH_GOOD")? {
            self.wiki.batch.good = v;
        }
        if let Some(v) = env_parse("BATCH_TOPVIEW")? {
            self.wiki.batch.topview = v;
        }
        if let Some(v) = env_parse("BATCH_RANDOM")? {
            self.wiki.batch.random = v;
        }
        if let Some(v) = env_parse("BATCH_MAX")? {
            self.wiki.batch.max = v;
        }
        if let Some(v) = env_parse("LOOP_SLEEP")? {
            self.wiki.cycle_sleep_secs = v;
        }
        if let Some(v) = env_parse("TOPVIEW_REFRESH")? {
            self.wiki.topview_ttl_secs = v;
        }

        if let Some(v) = env_string("SLUICE_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = env_string("SLUICE_LOG_FORMAT") {
            self.logging.format = v;
        }

        Ok(self)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        check_seconds("request_interval_secs", self.http.request_interval_secs)?;
        check_seconds("feeds.cycle_sleep_secs", self.feeds.cycle_sleep_secs)?;
        check_seconds("wiki.cycle_sleep_secs", self.wiki.cycle_sleep_secs)?;

        if self.http.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        let endpoint = url::Url::parse(&self.index.endpoint)
            .with_context(|| format!("Invalid index endpoint: {}", self.index.endpoint))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            anyhow::bail!("index endpoint must be an http(s) URL");
        }

        if self.feeds.summary_max == 0 || self.wiki.summary_max == 0 {
            anyhow::bail!("summary_max must be greater than 0");
        }

        if self.wiki.batch.max == 0 {
            anyhow::bail!("batch.max must be greater than 0");
        }

        if self.wiki.lang.trim().is_empty() {
            anyhow::bail!("wiki.lang must not be empty");
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!("logging.format must be text or json");
        }

        Ok(())
    }

    /// Minimum spacing between two outbound requests
    #[must_use]
    pub fn request_interval(&self) -> Duration {
        seconds(self.http.request_interval_secs)
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.http.request_timeout_secs)
    }
}

fn check_seconds(name: &str, value: f64) -> Result<()> {
    Duration::try_from_secs_f64(value)
        .map(|_| ())
        .map_err(|e| anyhow::anyhow!("{name} must be a non-negative number of seconds: {value} ({e})"))
}

/// Seconds as a `Duration`, saturating instead of panicking on values
/// [`Config::validate`] would reject
fn seconds(value: f64) -> Duration {
    if value.is_nan() || value <= 0.0 {
        Duration::ZERO
    } else {
        Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
    }
}

impl FeedsConfig {
    /// Sleep between two feed cycles
    #[must_use]
    pub fn cycle_sleep(&self) -> Duration {
        seconds(self.cycle_sleep_secs)
    }
}

impl WikiConfig {
    /// Sleep between two encyclopedia cycles
    #[must_use]
    pub fn cycle_sleep(&self) -> Duration {
        seconds(self.cycle_sleep_secs)
    }

    /// Lifetime of the top-viewed snapshot
    #[must_use]
    pub fn topview_ttl(&self) -> Duration {
        Duration::from_secs(self.topview_ttl_secs)
    }

    /// Base URL of the language edition, e.g. `https://ja.wikipedia.org`
    pub fn site_base(&self) -> String {
        self.site_base
            .clone()
            .unwrap_or_else(|| format!("https://{}.wikipedia.org", self.lang))
    }

    /// Base URL of the page-view ranking API
    pub fn metrics_base(&self) -> String {
        self.metrics_base
            .clone()
            .unwrap_or_else(|| String::from("https://wikimedia.org/api/rest_v1"))
    }

    /// Project identifier used by the ranking API, e.g. `ja.wikipedia`
    pub fn project(&self) -> String {
        format!("{}.wikipedia", self.lang)
    }
}

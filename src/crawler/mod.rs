//! Outbound HTTP with process-wide pacing
//!
//! Every request this process makes, whether a feed read, an API call or an
//! index submission, passes through one shared [`RateLimiter`](limiter::RateLimiter).
//! [`Crawler`] wires the client, the limiter and the two request roles
//! together from a [`Config`].

pub mod fetcher;
pub mod limiter;
pub mod submitter;
pub mod wiki;

use anyhow::{Context, Result};
use reqwest::Client;
use std::sync::Arc;

use crate::config::Config;
use crate::error::SluiceErrorTrait;
use crate::utils::error::FetchError;

pub use fetcher::Fetcher;
pub use limiter::RateLimiter;
pub use submitter::Submitter;
pub use wiki::WikiClient;

/// Shared HTTP stack: one client, one limiter, a reader and a writer
#[derive(Debug, Clone)]
pub struct Crawler {
    /// Rate limiter shared by the fetcher and the submitter
    limiter: Arc<RateLimiter>,

    /// Reads feeds and API records
    fetcher: Fetcher,

    /// Posts documents to the index
    submitter: Submitter,
}

impl Crawler {
    /// Build the HTTP stack described by `config`
    pub fn new(config: &Config) -> Result<Self> {
        config.validate().context("Invalid configuration")?;

        let client = build_client(config)?;
        let limiter = Arc::new(RateLimiter::new(config.request_interval()));

        Ok(Self {
            fetcher: Fetcher::new(client.clone(), Arc::clone(&limiter)),
            submitter: Submitter::new(client, Arc::clone(&limiter), config.index.endpoint.clone()),
            limiter,
        })
    }

    /// The shared rate limiter
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// The rate-limited reader
    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// The rate-limited index writer
    pub fn submitter(&self) -> &Submitter {
        &self.submitter
    }
}

/// Build the HTTP client with the configured user agent and timeout
pub fn build_client(config: &Config) -> Result<Client> {
    Client::builder()
        .user_agent(&config.http.user_agent)
        .timeout(config.request_timeout())
        .gzip(true)
        .build()
        .context("Failed to create HTTP client")
}

/// Log a failed read at the level its kind deserves.
///
/// A reply that arrived but was unusable (bad status, bad body) is a warning;
/// no reply at all is an error.
pub(crate) fn log_fetch_failure(kind: &str, target: &str, err: &FetchError) {
    let category = err.category().as_str();
    if err.response_received() {
        tracing::warn!(kind, target, category, error = %err, "Fetch returned an unusable response");
    } else {
        tracing::error!(kind, target, category, error = %err, "Fetch failed");
    }
}

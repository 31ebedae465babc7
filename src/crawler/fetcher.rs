//! Rate-limited HTTP reads
//!
//! This module provides the fetcher used for every outbound GET:
//! - one limiter grant per request, shared with the submitter
//! - a fixed timeout, reported as [`FetchError::Timeout`]
//! - charset detection for feed documents (header, then XML declaration)
//! - JSON decoding for API records
//!
//! There is no retry: a failed read is logged by the caller and the item is
//! picked up again on a later cycle.

use crate::crawler::limiter::RateLimiter;
use crate::utils::error::FetchError;
use encoding_rs::{Encoding, UTF_8};
use regex::bytes::Regex;
use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::{Arc, LazyLock};
use url::Url;

static DECLARED_ENCODING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^\s*<\?xml[^>]*?encoding\s*=\s*["']([A-Za-z0-9._-]+)["']"#)
        .expect("Invalid regex pattern")
});

/// A successful GET response
#[derive(Debug, Clone)]
pub struct FetchedBody {
    /// Raw response bytes
    pub bytes: Vec<u8>,

    /// Content-Type header, empty when absent
    pub content_type: String,
}

impl FetchedBody {
    /// Decode the body to UTF-8 text
    pub fn text(&self) -> String {
        decode_bytes(&self.bytes, &self.content_type)
    }
}

/// Fetcher for feeds and API records
#[derive(Debug, Clone)]
pub struct Fetcher {
    /// HTTP client with configured timeout and user agent
    client: Client,

    /// Process-wide pacing gate
    limiter: Arc<RateLimiter>,
}

impl Fetcher {
    /// Create a fetcher on top of a shared client and limiter
    pub fn new(client: Client, limiter: Arc<RateLimiter>) -> Self {
        Self { client, limiter }
    }

    /// GET `url` with optional query parameters.
    ///
    /// Takes exactly one limiter grant. Any status other than 200 is an error.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` before taking a grant when `url` does
    /// not parse, `FetchError::Status` for non-200 answers,
    /// `FetchError::Timeout` when the timeout elapsed and `FetchError::Http`
    /// for other transport failures.
    pub async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<FetchedBody, FetchError> {
        let mut target = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;
        if !query.is_empty() {
            target.query_pairs_mut().extend_pairs(query);
        }

        self.limiter.acquire().await;

        tracing::debug!(url = %target, "Fetching URL");

        let response = self
            .client
            .get(target)
            .send()
            .await
            .map_err(FetchError::from_transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_default();

        let bytes = response.bytes().await.map_err(FetchError::from_transport)?;

        Ok(FetchedBody {
            bytes: bytes.to_vec(),
            content_type,
        })
    }

    /// GET `url` and decode the body as JSON
    ///
    /// # Errors
    ///
    /// Same as [`Fetcher::get`], plus `FetchError::Json` for undecodable bodies.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let body = self.get(url, query).await?;
        Ok(serde_json::from_slice(&body.bytes)?)
    }

    /// Shared limiter
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }
}

/// Decode bytes to a UTF-8 string
///
/// Strategies, in order:
/// 1. `charset=` in the Content-Type header
/// 2. `encoding="..."` in the XML declaration
/// 3. byte-order mark, then UTF-8
///
/// Undecodable sequences are replaced rather than rejected; a few broken
/// characters in one entry should not discard the whole feed.
pub fn decode_bytes(bytes: &[u8], content_type: &str) -> String {
    let encoding = charset_from_content_type(content_type)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .or_else(|| declared_encoding(bytes))
        .unwrap_or(UTF_8);

    let (cow, _encoding, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::debug!(encoding = encoding.name(), "Replaced undecodable bytes");
    }

    cow.into_owned()
}

fn charset_from_content_type(content_type: &str) -> Option<&str> {
    content_type
        .split(';')
        .map(str::trim)
        .find_map(|part| {
            part.split_once('=')
                .filter(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
                .map(|(_, value)| value.trim().trim_matches('"'))
        })
        .filter(|value| !value.is_empty())
}

fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(256)];
    DECLARED_ENCODING
        .captures(head)
        .and_then(|caps| caps.get(1))
        .and_then(|label| Encoding::for_label(label.as_bytes()))
}

//! Rate-limited writes to the indexing endpoint

use serde::Serialize;
use std::sync::Arc;

use crate::crawler::limiter::RateLimiter;
use crate::models::NormalizedDocument;
use crate::utils::error::SubmitError;
use crate::utils::take_chars;

/// Characters of a rejected response body kept for the log line
const BODY_SNIPPET_CHARS: usize = 60;

/// Wire format accepted by the indexing endpoint.
///
/// `title` and `favicon` are always null: the endpoint scrapes them itself.
#[derive(Debug, Serialize)]
pub struct IndexRequest<'a> {
    pub url: &'a str,
    pub title: Option<&'a str>,
    pub favicon: Option<&'a str>,
    pub tags: &'a [String],
    pub descriptions: &'a str,
}

impl<'a> From<&'a NormalizedDocument> for IndexRequest<'a> {
    fn from(doc: &'a NormalizedDocument) -> Self {
        Self {
            url: &doc.url,
            title: None,
            favicon: None,
            tags: &doc.tags,
            descriptions: &doc.summary,
        }
    }
}

/// Posts normalized documents to the indexing endpoint
#[derive(Debug, Clone)]
pub struct Submitter {
    client: reqwest::Client,
    limiter: Arc<RateLimiter>,
    endpoint: String,
}

impl Submitter {
    /// Create a submitter sharing the fetcher's client and limiter
    pub fn new(client: reqwest::Client, limiter: Arc<RateLimiter>, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            limiter,
            endpoint: endpoint.into(),
        }
    }

    /// Endpoint receiving the documents
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST one document. Takes exactly one limiter grant; never retries.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::Rejected` for statuses at or above 300 and a
    /// transport variant when no response arrived.
    pub async fn submit(&self, doc: &NormalizedDocument) -> Result<u16, SubmitError> {
        self.limiter.acquire().await;

        let response = self
            .client
            .post(&self.endpoint)
            .json(&IndexRequest::from(doc))
            .send()
            .await
            .map_err(SubmitError::from_transport)?;

        let status = response.status().as_u16();
        if status >= 300 {
            let body = response.text().await.unwrap_or_default();
            return Err(SubmitError::Rejected {
                status,
                body: take_chars(&body, BODY_SNIPPET_CHARS).to_string(),
            });
        }

        Ok(status)
    }
}

//! Feed harvesting
//!
//! One cycle visits every catalog source in order: fetch the document, parse
//! it, and submit the first `max_entries_per_feed` entries. A source that
//! cannot be fetched or parsed is skipped until the next cycle.

use async_trait::async_trait;

use crate::catalog::SourceCatalog;
use crate::config::FeedsConfig;
use crate::crawler::{log_fetch_failure, Crawler, Fetcher, Submitter};
use crate::error::SluiceErrorTrait;
use crate::harvest::submit_document;
use crate::models::{CycleStats, ItemOutcome, RawContent, Source};
use crate::parser::{parse_feed, Extension, Normalizer};
use crate::scheduler::Harvest;

/// Feeds mode
pub struct FeedHarvest {
    catalog: SourceCatalog,
    fetcher: Fetcher,
    submitter: Submitter,
    normalizer: Normalizer,
    max_entries: usize,
}

impl FeedHarvest {
    pub fn new(catalog: SourceCatalog, crawler: &Crawler, config: &FeedsConfig) -> Self {
        Self {
            catalog,
            fetcher: crawler.fetcher().clone(),
            submitter: crawler.submitter().clone(),
            normalizer: Normalizer::new(config.summary_max),
            max_entries: config.max_entries_per_feed,
        }
    }

    pub fn catalog(&self) -> &SourceCatalog {
        &self.catalog
    }

    /// Fetch one source and submit its leading entries
    pub async fn harvest_source(&self, source: &Source) -> CycleStats {
        let mut stats = CycleStats::default();

        let body = match self.fetcher.get(&source.url, &[]).await {
            Ok(body) => body,
            Err(e) => {
                log_fetch_failure("feed", &source.name, &e);
                stats.record(e.category().outcome());
                return stats;
            }
        };

        let entries = match parse_feed(&body.text()) {
            Ok(entries) => entries,
            Err(e) => {
                log_fetch_failure("feed", &source.name, &e);
                stats.record(e.category().outcome());
                return stats;
            }
        };

        tracing::debug!(source = %source.name, entries = entries.len(), "Parsed feed");

        let extensions = Extension::from_hints(&source.plugins);
        for entry in entries.iter().take(self.max_entries) {
            let raw = RawContent::Feed { source, entry };

            let outcome = match self.normalizer.normalize_with(&raw, &extensions) {
                Some(doc) => submit_document(&self.submitter, &source.name, &doc).await,
                None => {
                    tracing::debug!(source = %source.name, "Entry has no link, skipping");
                    ItemOutcome::Skipped
                }
            };
            stats.record(outcome);
        }

        stats
    }
}

#[async_trait]
impl Harvest for FeedHarvest {
    type Item = Source;

    fn name(&self) -> &'static str {
        "feeds"
    }

    async fn assemble(&mut self) -> Vec<Source> {
        self.catalog.sources().to_vec()
    }

    async fn process(&self, source: &Source) -> CycleStats {
        self.harvest_source(source).await
    }
}

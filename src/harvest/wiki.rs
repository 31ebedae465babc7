//! Encyclopedia harvesting
//!
//! A batch is composed fresh every cycle, in this order:
//! 1. `featured` titles from the featured-article rotation
//! 2. `good` titles from the good-article rotation
//! 3. `topview` titles drained from yesterday's most viewed pages, after
//!    refreshing that snapshot if it is empty or older than its TTL
//! 4. random titles topping the batch up to `max`, requested at most
//!    `random` at a time (`0` asks for the whole shortfall at once)
//!
//! Repeated titles are then dropped, keeping the first occurrence.

use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::time::Instant;

use crate::config::{BatchConfig, WikiConfig};
use crate::crawler::{log_fetch_failure, Crawler, Submitter, WikiClient};
use crate::error::SluiceErrorTrait;
use crate::harvest::submit_document;
use crate::models::{CycleStats, ItemOutcome, RawContent};
use crate::parser::Normalizer;
use crate::scheduler::{dedup_preserving_order, CyclicQueue, FreshnessCache, Harvest, RotationQueue};

/// Encyclopedia mode
pub struct WikiHarvest {
    client: WikiClient,
    submitter: Submitter,
    normalizer: Normalizer,
    batch: BatchConfig,
    featured_category: String,
    good_category: String,
    category_limit: usize,
    featured: CyclicQueue<String>,
    good: CyclicQueue<String>,
    topview: FreshnessCache<String>,
    rng: StdRng,
}

impl WikiHarvest {
    /// Create a harvester with empty rotations; see [`WikiHarvest::load_categories`]
    pub fn new(crawler: &Crawler, config: &WikiConfig) -> Self {
        let client = WikiClient::new(crawler.fetcher().clone(), config);
        Self::with_client(client, crawler.submitter().clone(), config)
    }

    pub fn with_client(client: WikiClient, submitter: Submitter, config: &WikiConfig) -> Self {
        Self {
            client,
            submitter,
            normalizer: Normalizer::new(config.summary_max),
            batch: config.batch.clone(),
            featured_category: config.featured_category.clone(),
            good_category: config.good_category.clone(),
            category_limit: config.category_limit,
            featured: CyclicQueue::default(),
            good: CyclicQueue::default(),
            topview: FreshnessCache::new(config.topview_ttl()),
            rng: StdRng::from_entropy(),
        }
    }

    /// Use a seeded shuffle source
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Fill the featured and good rotations from their categories.
    ///
    /// Only rotations with a non-zero batch quota are loaded. Titles are
    /// shuffled once here and then cycled in that order.
    pub async fn load_categories(&mut self) {
        if self.batch.featured > 0 {
            let titles = self
                .client
                .category_titles(&self.featured_category, self.category_limit)
                .await;
            tracing::info!(category = %self.featured_category, count = titles.len(), "Loaded featured titles");
            self.featured = CyclicQueue::shuffled(titles, &mut self.rng);
        }

        if self.batch.good > 0 {
            let titles = self
                .client
                .category_titles(&self.good_category, self.category_limit)
                .await;
            tracing::info!(category = %self.good_category, count = titles.len(), "Loaded good titles");
            self.good = CyclicQueue::shuffled(titles, &mut self.rng);
        }
    }

    /// Compose the next batch of titles
    ///
    /// `now` gates the top-viewed refresh; `ranking_day` is the day whose
    /// ranking is fetched when a refresh is due.
    pub async fn assemble_batch(&mut self, now: Instant, ranking_day: NaiveDate) -> Vec<String> {
        let mut titles = Vec::with_capacity(self.batch.max);

        titles.extend(self.featured.take(self.batch.featured));
        titles.extend(self.good.take(self.batch.good));

        if self.batch.topview > 0 {
            if self.topview.needs_refresh(now) {
                self.refresh_topview(now, ranking_day).await;
            }
            titles.extend(self.topview.take(self.batch.topview));
        }

        let mut need = self.batch.max.saturating_sub(titles.len());
        while need > 0 {
            let request = match self.batch.random {
                0 => need,
                chunk => need.min(chunk),
            };
            let sampled = self.client.random_titles(request).await;
            if sampled.is_empty() {
                tracing::warn!(short = need, "Random sampling returned nothing, batch stays short");
                break;
            }
            need = need.saturating_sub(sampled.len());
            titles.extend(sampled);
        }

        dedup_preserving_order(titles)
    }

    async fn refresh_topview(&mut self, now: Instant, day: NaiveDate) {
        let mut ranking = self.client.top_viewed(day).await;
        ranking.shuffle(&mut self.rng);

        match self.topview.replace(now, ranking) {
            Ok(count) => tracing::info!(count, day = %day, "Refreshed top-viewed titles"),
            Err(e) => tracing::warn!(
                error = %e,
                category = e.category().as_str(),
                kept = self.topview.len(),
                "Keeping previous top-viewed titles"
            ),
        }
    }

    /// Fetch one page summary and submit it
    pub async fn harvest_title(&self, title: &str) -> ItemOutcome {
        let summary = match self.client.page_summary(title).await {
            Ok(summary) => summary,
            Err(e) => {
                log_fetch_failure("summary", title, &e);
                return e.category().outcome();
            }
        };

        let page_url = self.client.page_url(title);
        let raw = RawContent::Page {
            title,
            fallback_url: &page_url,
            summary: &summary,
        };

        match self.normalizer.normalize(&raw) {
            Some(doc) => submit_document(&self.submitter, "wiki", &doc).await,
            None => {
                tracing::debug!(title, "Page has no extract, skipping");
                ItemOutcome::Skipped
            }
        }
    }

    pub fn featured(&self) -> &CyclicQueue<String> {
        &self.featured
    }

    pub fn good(&self) -> &CyclicQueue<String> {
        &self.good
    }

    pub fn topview(&self) -> &FreshnessCache<String> {
        &self.topview
    }
}

/// The day whose page-view ranking is complete: the day before `today`
pub fn ranking_day(today: NaiveDate) -> NaiveDate {
    today.checked_sub_days(Days::new(1)).unwrap_or(today)
}

#[async_trait]
impl Harvest for WikiHarvest {
    type Item = String;

    fn name(&self) -> &'static str {
        "wiki"
    }

    async fn assemble(&mut self) -> Vec<String> {
        self.assemble_batch(Instant::now(), ranking_day(Utc::now().date_naive()))
            .await
    }

    async fn process(&self, title: &String) -> CycleStats {
        let mut stats = CycleStats::default();
        stats.record(self.harvest_title(title).await);
        stats
    }
}

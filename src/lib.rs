//! sluice - rate-limited multi-source harvester
//!
//! Polls RSS/Atom feeds and encyclopedia APIs on a fixed cycle, normalizes
//! what it finds and forwards each document to a search index endpoint.
//! Every outbound request in the process shares one pacing gate.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration from environment and TOML files
//! - [`catalog`] - Feed source catalog
//! - [`crawler`] - Rate limiter, fetcher, index submitter, encyclopedia client
//! - [`parser`] - Feed parsing, normalization and plugin extensions
//! - [`scheduler`] - Cycle loop and rotation queues
//! - [`harvest`] - Feeds and encyclopedia modes
//! - [`models`] - Core data structures and types
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use sluice::catalog::SourceCatalog;
//! use sluice::config::Config;
//! use sluice::crawler::Crawler;
//! use sluice::harvest::FeedHarvest;
//! use sluice::scheduler::CyclicScheduler;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let crawler = Crawler::new(&config)?;
//!     let harvest = FeedHarvest::new(SourceCatalog::bundled()?, &crawler, &config.feeds);
//!     let stats = CyclicScheduler::new(harvest, config.feeds.cycle_sleep())
//!         .run_once()
//!         .await;
//!     println!("submitted {}", stats.submitted);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod crawler;
pub mod error;
pub mod harvest;
pub mod models;
pub mod parser;
pub mod scheduler;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::catalog::SourceCatalog;
    pub use crate::config::Config;
    pub use crate::crawler::{Crawler, Fetcher, RateLimiter, Submitter, WikiClient};
    pub use crate::error::{Error, ErrorCategory, Result, SluiceErrorTrait};
    pub use crate::harvest::{FeedHarvest, WikiHarvest};
    pub use crate::models::{CycleStats, FeedEntry, ItemOutcome, NormalizedDocument, Source};
    pub use crate::parser::Normalizer;
    pub use crate::scheduler::{CyclicScheduler, Harvest};
}

// Direct re-exports for convenience
pub use models::{CycleStats, NormalizedDocument, Source};

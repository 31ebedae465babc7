//! Harvest modes
//!
//! Each mode implements [`Harvest`](crate::scheduler::Harvest) and is driven
//! by a [`CyclicScheduler`](crate::scheduler::CyclicScheduler):
//!
//! - [`feeds`] walks the source catalog every cycle
//! - [`wiki`] composes a batch of encyclopedia titles from rotation queues

pub mod feeds;
pub mod wiki;

pub use feeds::FeedHarvest;
pub use wiki::WikiHarvest;

use crate::crawler::Submitter;
use crate::models::{ItemOutcome, NormalizedDocument};
use crate::utils::error::SubmitError;

/// Characters of the title shown on success lines
const OK_TITLE_CHARS: usize = 60;

/// Characters of the title shown on failure lines
const WARN_TITLE_CHARS: usize = 38;

/// Submit one document and log the result
pub(crate) async fn submit_document(
    submitter: &Submitter,
    origin: &str,
    doc: &NormalizedDocument,
) -> ItemOutcome {
    match submitter.submit(doc).await {
        Ok(status) => {
            tracing::info!(
                origin,
                status,
                title = doc.short_title(OK_TITLE_CHARS),
                "Submitted"
            );
            ItemOutcome::Submitted
        }
        Err(SubmitError::Rejected { status, body }) => {
            tracing::warn!(
                origin,
                status,
                title = doc.short_title(WARN_TITLE_CHARS),
                body = %body,
                "Index rejected document"
            );
            ItemOutcome::Rejected
        }
        Err(e) => {
            tracing::error!(
                origin,
                title = doc.short_title(WARN_TITLE_CHARS),
                error = %e,
                "Submit failed"
            );
            ItemOutcome::Failed
        }
    }
}

//! Cycle scheduling and batch rotation
//!
//! # Overview
//!
//! Both harvest modes run the same loop: assemble a batch, process every
//! item sequentially, sleep, repeat. What differs is how the batch is built.
//!
//! ```text
//!   START ──▶ CYCLE-RUNNING ──▶ SLEEPING ──┐
//!                  ▲                       │
//!                  └───────────────────────┘
//!        (shutdown signal from any state ──▶ STOPPED)
//! ```
//!
//! # Modules
//!
//! - [`cycle`] - the loop itself and the [`Harvest`] trait modes implement
//! - [`rotation`] - cyclic, drain and freshness-gated queues used to compose
//!   encyclopedia batches

pub mod cycle;
pub mod rotation;

pub use cycle::{CyclicScheduler, Harvest, Phase, RunSummary};
pub use rotation::{dedup_preserving_order, CyclicQueue, DrainQueue, FreshnessCache, RotationQueue};

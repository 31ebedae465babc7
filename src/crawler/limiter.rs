//! Process-wide request pacing
//!
//! Every outbound request, whether a fetch or a submit, goes through one
//! [`RateLimiter`]. Consecutive grants are spaced by at least the configured
//! interval, and concurrent callers are served in arrival order.

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

type DirectLimiter = governor::RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Shared minimum-spacing gate for network operations
///
/// Wrap it in an `Arc` and hand the same instance to every component that
/// talks to the network; the budget is global, not per operation.
pub struct RateLimiter {
    /// Configured spacing between grants
    interval: Duration,

    /// Burst-of-one GCRA quota; `None` when the interval is zero
    governor: Option<DirectLimiter>,

    /// Critical section around wait-and-grant.
    /// `tokio::sync::Mutex` queues waiters fairly, which gives FIFO grants.
    gate: Mutex<()>,

    /// Total grants handed out
    grants: AtomicU64,
}

impl RateLimiter {
    /// Create a limiter that allows one request per `interval`
    pub fn new(interval: Duration) -> Self {
        let governor = Quota::with_period(interval).map(DirectLimiter::direct);

        Self {
            interval,
            governor,
            gate: Mutex::new(()),
            grants: AtomicU64::new(0),
        }
    }

    /// Wait until a request may be issued, then record the grant.
    ///
    /// Never fails; the first call returns immediately.
    pub async fn acquire(&self) {
        let _gate = self.gate.lock().await;

        if let Some(governor) = &self.governor {
            governor.until_ready().await;
        }

        self.grants.fetch_add(1, Ordering::Relaxed);
    }

    /// Configured spacing between grants
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of grants handed out so far
    pub fn grants(&self) -> u64 {
        self.grants.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("interval", &self.interval)
            .field("grants", &self.grants())
            .finish()
    }
}

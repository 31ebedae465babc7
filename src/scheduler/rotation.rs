//! Rotation queues feeding the encyclopedia batch
//!
//! Three disciplines share the [`RotationQueue`] interface:
//! - [`CyclicQueue`]: items taken from the front go back to the end, so
//!   membership never changes
//! - [`DrainQueue`]: items are removed permanently, newest first
//! - [`FreshnessCache`]: a drain queue whose snapshot is replaced from an
//!   external ranking once it is empty or older than its time-to-live
//!
//! None of these perform I/O. Time is passed in by the caller.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashSet, VecDeque};
use std::hash::Hash;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Common interface of the batch sources
pub trait RotationQueue<T> {
    /// Take up to `n` items according to the queue's discipline
    fn take(&mut self, n: usize) -> Vec<T>;

    /// Number of items currently held
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Cyclic
// ============================================================================

/// Round-robin over a fixed membership
#[derive(Debug, Clone)]
pub struct CyclicQueue<T> {
    items: VecDeque<T>,
}

impl<T> Default for CyclicQueue<T> {
    fn default() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }
}

impl<T: Clone> CyclicQueue<T> {
    /// Queue in the given order
    pub fn new(items: Vec<T>) -> Self {
        Self { items: items.into() }
    }

    /// Queue in a random order drawn from `rng`
    pub fn shuffled<R: Rng + ?Sized>(mut items: Vec<T>, rng: &mut R) -> Self {
        items.shuffle(rng);
        Self::new(items)
    }
}

impl<T: Clone> RotationQueue<T> for CyclicQueue<T> {
    /// Each item is handed out at most once per call, so `n` larger than the
    /// queue yields the whole membership once.
    fn take(&mut self, n: usize) -> Vec<T> {
        let count = n.min(self.items.len());
        let mut out = Vec::with_capacity(count);

        for _ in 0..count {
            if let Some(item) = self.items.pop_front() {
                self.items.push_back(item.clone());
                out.push(item);
            }
        }

        out
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

// ============================================================================
// Drain
// ============================================================================

/// Consume-once queue; `take` pops from the back
#[derive(Debug, Clone)]
pub struct DrainQueue<T> {
    items: Vec<T>,
}

impl<T> Default for DrainQueue<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> DrainQueue<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<T> RotationQueue<T> for DrainQueue<T> {
    fn take(&mut self, n: usize) -> Vec<T> {
        let count = n.min(self.items.len());
        let start = self.items.len() - count;
        self.items.drain(start..).rev().collect()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

// ============================================================================
// Freshness-gated
// ============================================================================

/// Snapshot of an external ranking, drained between refreshes
#[derive(Debug, Clone)]
pub struct FreshnessCache<T> {
    snapshot: DrainQueue<T>,
    last_refresh: Option<Instant>,
    ttl: Duration,
}

impl<T> FreshnessCache<T> {
    /// Empty cache; the first check always asks for a refresh
    pub fn new(ttl: Duration) -> Self {
        Self {
            snapshot: DrainQueue::new(Vec::new()),
            last_refresh: None,
            ttl,
        }
    }

    /// Whether the snapshot is empty or older than the time-to-live at `now`
    pub fn needs_refresh(&self, now: Instant) -> bool {
        if self.snapshot.is_empty() {
            return true;
        }

        match self.last_refresh {
            Some(last) => now.saturating_duration_since(last) > self.ttl,
            None => true,
        }
    }

    /// Replace the snapshot with a fresh ranking taken at `now`.
    ///
    /// An empty ranking keeps the previous snapshot and its timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaleCache`] when `items` is empty.
    pub fn replace(&mut self, now: Instant, items: Vec<T>) -> Result<usize> {
        if items.is_empty() {
            return Err(Error::StaleCache);
        }

        let count = items.len();
        self.snapshot = DrainQueue::new(items);
        self.last_refresh = Some(now);
        Ok(count)
    }

    /// When the current snapshot was taken
    pub fn last_refresh(&self) -> Option<Instant> {
        self.last_refresh
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl<T> RotationQueue<T> for FreshnessCache<T> {
    fn take(&mut self, n: usize) -> Vec<T> {
        self.snapshot.take(n)
    }

    fn len(&self) -> usize {
        self.snapshot.len()
    }
}

/// Drop repeated items, keeping the first occurrence of each
pub fn dedup_preserving_order<T: Eq + Hash + Clone>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

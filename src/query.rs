//! Latest-wins asynchronous lookups.
//!
//! Lookups triggered by input changes (resolving a package name while it is being
//! typed, fetching the latest version) can complete out of order. A
//! [`CoalescedQuery`] numbers every call and only hands back the result of the most
//! recent one.

use std::{
    future::Future,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};
use tracing::trace;

/// Runs lookups, discarding results that were superseded while in flight
#[derive(Debug, Default)]
pub struct CoalescedQuery {
    latest: AtomicU64,
    debounce: Option<Duration>,
}

impl CoalescedQuery {
    /// A query without debouncing
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait `delay` before starting each lookup, so bursts of calls only run the last
    pub fn with_debounce(delay: Duration) -> Self {
        Self {
            latest: AtomicU64::new(0),
            debounce: Some(delay),
        }
    }

    /// Sequence number of the most recent call
    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    fn is_current(&self, seq: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == seq
    }

    /// Run `lookup`. Returns `None` if another call started before it finished.
    pub async fn run<F, T>(&self, lookup: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(delay) = self.debounce {
            tokio::time::sleep(delay).await;
            if !self.is_current(seq) {
                trace!("query #{seq} superseded before it started");
                return None;
            }
        }
        let output = lookup.await;
        if self.is_current(seq) {
            Some(output)
        } else {
            trace!("dropping stale result of query #{seq}");
            None
        }
    }
}

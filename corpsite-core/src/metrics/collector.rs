//! In-process request counters

use super::MetricsSnapshot;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counts outbound API traffic for status reporting
///
/// The `metrics` facade has no read side, so the client keeps its own tallies
/// next to the facade calls.
#[derive(Debug, Default)]
pub struct RequestMetrics {
    requests: AtomicU64,
    failures: AtomicU64,
    auth_expired: AtomicU64,
    stale_discarded: AtomicU64,
}

impl RequestMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_requests(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_failures(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_auth_expired(&self) {
        self.auth_expired.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_stale_discarded(&self) {
        self.stale_discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: std::time::SystemTime::now(),
            requests: self.requests.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            auth_expired: self.auth_expired.load(Ordering::Relaxed),
            stale_discarded: self.stale_discarded.load(Ordering::Relaxed),
        }
    }
}

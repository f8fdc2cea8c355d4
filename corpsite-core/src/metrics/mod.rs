//! Metrics for the API client and entity slices
//!
//! Names are recorded through the `metrics` facade so an embedding app can
//! install any recorder; [`RequestMetrics`] keeps local totals for the CLI.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Instant;

mod collector;

pub use collector::RequestMetrics;

pub const API_REQUESTS_TOTAL: &str = "api.requests.total";
pub const API_REQUESTS_FAILED: &str = "api.requests.failed";
pub const API_AUTH_EXPIRED: &str = "api.auth.expired";
pub const API_REQUEST_DURATION_MS: &str = "api.request.duration_ms";
pub const STORE_STALE_DISCARDED: &str = "store.responses.stale_discarded";

/// Register metric descriptions with the installed recorder
pub fn init_metrics() {
    describe_counter!(API_REQUESTS_TOTAL, "Outbound REST requests issued");
    describe_counter!(API_REQUESTS_FAILED, "Outbound REST requests that failed");
    describe_counter!(API_AUTH_EXPIRED, "Responses with status 401 that ended the session");
    describe_histogram!(API_REQUEST_DURATION_MS, "REST request duration in milliseconds");
    describe_counter!(
        STORE_STALE_DISCARDED,
        "Fetch results dropped because a newer fetch was issued"
    );
}

pub fn record_counter(name: &'static str, value: u64) {
    counter!(name).increment(value);
}

/// Timer for measuring operation duration
pub struct Timer {
    name: &'static str,
    start: Instant,
}

impl Timer {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }

    /// Stop the timer and record the duration in milliseconds
    pub fn stop(self) -> f64 {
        let elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        histogram!(self.name).record(elapsed_ms);
        elapsed_ms
    }
}

/// Point-in-time copy of [`RequestMetrics`]
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub timestamp: std::time::SystemTime,
    pub requests: u64,
    pub failures: u64,
    pub auth_expired: u64,
    pub stale_discarded: u64,
}

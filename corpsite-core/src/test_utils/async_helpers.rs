//! Async test helpers
//!
//! Timeout wrappers around the broadcast and watch channels used for language
//! and state notifications.

use std::future::Future;
use tokio::sync::{broadcast, watch};
use tokio::time::{timeout, Duration};

/// Default timeout duration for tests (5 seconds)
pub const DEFAULT_TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Short timeout for tests that expect nothing to happen (100ms)
pub const SHORT_TEST_TIMEOUT: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecvTimeoutError {
    Timeout,
    Closed,
    Lagged(u64),
}

impl std::fmt::Display for RecvTimeoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecvTimeoutError::Timeout => write!(f, "receive operation timed out"),
            RecvTimeoutError::Closed => write!(f, "channel closed"),
            RecvTimeoutError::Lagged(n) => write!(f, "receiver lagged by {n} messages"),
        }
    }
}

impl std::error::Error for RecvTimeoutError {}

/// Next broadcast event, or an error after `duration`
pub async fn recv_broadcast<T: Clone>(
    rx: &mut broadcast::Receiver<T>,
    duration: Duration,
) -> Result<T, RecvTimeoutError> {
    match timeout(duration, rx.recv()).await {
        Err(_) => Err(RecvTimeoutError::Timeout),
        Ok(Ok(value)) => Ok(value),
        Ok(Err(broadcast::error::RecvError::Closed)) => Err(RecvTimeoutError::Closed),
        Ok(Err(broadcast::error::RecvError::Lagged(n))) => Err(RecvTimeoutError::Lagged(n)),
    }
}

/// Every broadcast event already queued, without waiting
pub fn drain_broadcast<T: Clone>(rx: &mut broadcast::Receiver<T>) -> Vec<T> {
    let mut results = Vec::new();
    while let Ok(value) = rx.try_recv() {
        results.push(value);
    }
    results
}

/// Wait until the watched value satisfies `predicate` and return a copy
pub async fn wait_for<T, F>(
    rx: &mut watch::Receiver<T>,
    duration: Duration,
    predicate: F,
) -> Result<T, RecvTimeoutError>
where
    T: Clone,
    F: FnMut(&T) -> bool,
{
    match timeout(duration, rx.wait_for(predicate)).await {
        Err(_) => Err(RecvTimeoutError::Timeout),
        Ok(Ok(value)) => Ok((*value).clone()),
        Ok(Err(_)) => Err(RecvTimeoutError::Closed),
    }
}

/// Helper to assert a future completes within duration
pub async fn assert_completes_within<F, T>(duration: Duration, future: F) -> T
where
    F: Future<Output = T>,
{
    match timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => panic!("Future did not complete within {:?}", duration),
    }
}

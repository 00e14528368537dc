//! Transient/permanent failure classification and backoff delay math
//!
//! The fetcher's retry loop consumes an explicit classification rather than
//! matching on error hierarchies: [`IsTransient`] decides whether a failed
//! attempt earns another try, and [`backoff_delay`] computes how long to
//! sleep before it.

use crate::config::RetryConfig;
use crate::error::FetchError;
use std::time::Duration;

/// Trait for errors that can be classified as transient or permanent
///
/// Transient failures (connection errors, timeouts, server-side 5xx, empty
/// downloads) consume a retry attempt. Permanent failures (404, local file
/// system conflicts) are surfaced immediately.
pub trait IsTransient {
    /// Returns true if the operation should be retried
    fn is_transient(&self) -> bool;
}

impl IsTransient for FetchError {
    fn is_transient(&self) -> bool {
        match self {
            // The dump will never exist at this URL
            FetchError::NotFound { .. } => false,
            // Terminal by construction
            FetchError::RetriesExhausted { .. } => false,
            // Retrying will not clear a broken file system state
            FetchError::StateConflict { .. } => false,
            // A zero-byte body is treated like a dropped connection
            FetchError::EmptyDownload { .. } => true,
            // Non-404 status: server-side trouble, worth retrying
            FetchError::HttpStatus { .. } => true,
            // Connect/timeout/body-read errors are transient; a client that
            // could not even be built is not
            FetchError::Network(e) => !e.is_builder(),
            // Write failures mid-stream include network errors surfaced
            // through the stream reader
            FetchError::Io(_) => true,
        }
    }
}

/// Delay before the attempt following failed attempt number `attempt`
///
/// `backoff_multiplier ^ attempt` seconds, capped at `max_delay`. Attempts
/// are numbered from 1, so a multiplier of 1.5 yields 1.5s, 2.25s, 3.375s...
pub fn backoff_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let secs = config.backoff_multiplier.powi(attempt.min(i32::MAX as u32) as i32);
    if !secs.is_finite() || secs < 0.0 {
        return config.max_delay;
    }
    Duration::try_from_secs_f64(secs)
        .unwrap_or(config.max_delay)
        .min(config.max_delay)
}

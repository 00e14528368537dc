//! Error types for pageviews-dl
//!
//! Every failure mode in the pipeline is a distinct, named condition:
//! fetch failures carry their own taxonomy ([`FetchError`]) so callers can
//! tell a permanent 404 apart from an exhausted retry budget, and extraction
//! failures name the artifact that could not be trusted.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pageviews-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for pageviews-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Fetch-related error (network, retries, local file state)
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Invalid hour coordinate (out-of-range year/month/day/hour)
    #[error("invalid hour coordinate: {message}")]
    InvalidCoordinate {
        /// Human-readable description of which field is out of range
        message: String,
    },

    /// Decompression or read failure while streaming the artifact
    ///
    /// Extraction is all-or-nothing: when this is raised, no records from
    /// the artifact can be trusted and none are returned.
    #[error("corrupt artifact {path}: {reason}")]
    CorruptArtifact {
        /// The artifact that failed to decompress or read
        path: PathBuf,
        /// The underlying I/O or gzip error
        reason: String,
    },

    /// Artifact filename does not encode an hour timestamp
    ///
    /// Only raised when [`ExtractConfig::require_hour_in_name`] is set;
    /// otherwise the extractor falls back to the current time and warns.
    ///
    /// [`ExtractConfig::require_hour_in_name`]: crate::config::ExtractConfig::require_hour_in_name
    #[error("artifact filename does not encode an hour: {path}")]
    HourNotInFilename {
        /// The artifact whose name did not match the expected pattern
        path: PathBuf,
    },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Fetch-related errors
///
/// The retry loop classifies these as transient or permanent via
/// [`IsTransient`](crate::retry::IsTransient): only transient failures
/// consume retry attempts.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Remote resource does not exist (HTTP 404). Permanent — the dump will
    /// never appear at this URL, so it is surfaced without retrying.
    #[error("resource not found on server (404): {url}")]
    NotFound {
        /// The URL that returned 404
        url: String,
    },

    /// All retry attempts were consumed by transient failures
    #[error("failed to download {url} after {attempts} attempts")]
    RetriesExhausted {
        /// The URL that could not be fetched
        url: String,
        /// The number of attempts made before giving up
        attempts: u32,
    },

    /// Unable to remove or replace a local file. Fatal — retrying will not
    /// clear a broken file system state.
    #[error("local state conflict at {path}: {reason}")]
    StateConflict {
        /// The path that could not be removed or moved into place
        path: PathBuf,
        /// The underlying file system error
        reason: String,
    },

    /// Completed download was zero bytes. Treated like a transient network
    /// failure and retried.
    #[error("downloaded file is empty: {url}")]
    EmptyDownload {
        /// The URL that produced an empty body
        url: String,
    },

    /// Non-success HTTP status other than 404
    #[error("HTTP status {status} fetching {url}")]
    HttpStatus {
        /// The status code returned by the server
        status: u16,
        /// The URL that was being fetched
        url: String,
    },

    /// Network error (connection, timeout, body read)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error while streaming the response body to disk
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

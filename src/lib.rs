//! # pageviews-dl
//!
//! Embeddable acquisition-and-extraction pipeline for hourly Wikimedia
//! pageview dumps: fetch one hour's compressed snapshot reliably, stream it
//! through gzip decompression, and pull out the records matching a watchlist
//! of page titles.
//!
//! ## Design Philosophy
//!
//! - **Library-first** - no CLI or scheduler; the consumer invokes one run
//!   per logical hour
//! - **Atomic artifacts** - a file observed at the final path is always a
//!   complete download
//! - **Streaming** - the decompressed dump is never materialized in memory
//! - **Named failures** - every failure mode is a distinct error variant,
//!   never a generic catch-all
//!
//! ## Quick Start
//!
//! ```no_run
//! use pageviews_dl::{ExtractConfig, FetchConfig, HourCoordinate, PageviewFetcher, extract};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = PageviewFetcher::new(FetchConfig::default())?;
//!     let coord = HourCoordinate::new(2025, 6, 15, 14)?;
//!     let artifact = fetcher.fetch(&coord, Path::new("./output")).await?;
//!
//!     let config = ExtractConfig {
//!         watchlist: vec!["Amazon".into(), "Apple".into(), "Microsoft".into()],
//!         ..Default::default()
//!     };
//!     let matches = extract(&artifact, &config)?;
//!     println!("{} watchlist hits", matches.len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Streaming watchlist extraction from compressed dumps
pub mod extractor;
/// Resilient dump retrieval with retries and atomic publication
pub mod fetcher;
/// Pipeline composition and collaborator seams
pub mod pipeline;
/// Failure classification and backoff delay math
pub mod retry;
/// Core types: coordinates, records, match policy
pub mod types;

// Re-export commonly used types
pub use config::{DEFAULT_BASE_URL, ExtractConfig, FetchConfig, RetryConfig};
pub use error::{Error, FetchError, Result};
pub use extractor::extract;
pub use fetcher::PageviewFetcher;
pub use pipeline::{NoOpNotifier, NoOpSink, Notifier, RecordSink, RunSummary, run_hourly};
pub use retry::IsTransient;
pub use types::{HourCoordinate, MatchMode, MatchedRecord, PageviewRecord};

//! Hourly pipeline composition: fetch → extract → load → notify
//!
//! The core of the crate is the fetcher and the extractor; persistence and
//! notification are external collaborators behind the [`RecordSink`] and
//! [`Notifier`] traits. [`run_hourly`] wires the four stages together for
//! one hour coordinate and hands the consumer a [`RunSummary`].
//!
//! Stub implementations ([`NoOpSink`], [`NoOpNotifier`]) are provided for
//! consumers that only want the acquisition side.

use crate::config::ExtractConfig;
use crate::error::{Error, Result};
use crate::extractor;
use crate::fetcher::PageviewFetcher;
use crate::types::{HourCoordinate, MatchedRecord};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Destination for matched records (database, file, message bus...)
///
/// Implementations are responsible for idempotent persistence; the pipeline
/// hands over the full ordered batch for one hour in a single call.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Persist a batch of matched records, returning how many were stored
    async fn load(&self, records: &[MatchedRecord]) -> Result<u64>;
}

/// Consumer of run summaries (Slack webhook, email, log line...)
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a human-facing summary of one pipeline run
    async fn notify(&self, summary: &RunSummary) -> Result<()>;
}

/// Sink that discards all records
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpSink;

#[async_trait]
impl RecordSink for NoOpSink {
    async fn load(&self, records: &[MatchedRecord]) -> Result<u64> {
        tracing::debug!(count = records.len(), "no-op sink discarding records");
        Ok(0)
    }
}

/// Notifier that does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpNotifier;

#[async_trait]
impl Notifier for NoOpNotifier {
    async fn notify(&self, _summary: &RunSummary) -> Result<()> {
        Ok(())
    }
}

/// Summary of one completed hourly run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Caller-supplied run identifier
    pub run_id: String,
    /// The hour the records were stamped with, if any matched
    pub hour_timestamp: Option<NaiveDateTime>,
    /// Number of watchlist matches extracted
    pub records_matched: usize,
    /// Number of records the sink reported as stored
    pub records_loaded: u64,
}

/// Run the full pipeline for one hour coordinate
///
/// Fetches the dump into `dest_dir`, extracts watchlist matches (on a
/// blocking worker, since decompression is CPU- and disk-bound), loads them
/// through `sink`, and notifies. The artifact file is left in place for the
/// caller to clean up.
///
/// A sink failure fails the run; a notifier failure is logged at warn and
/// does not, since by then the records are already persisted.
///
/// # Errors
///
/// Propagates fetch, extraction, and sink errors unchanged.
pub async fn run_hourly(
    fetcher: &PageviewFetcher,
    extract_config: &ExtractConfig,
    coord: &HourCoordinate,
    dest_dir: &Path,
    run_id: &str,
    sink: &dyn RecordSink,
    notifier: &dyn Notifier,
) -> Result<RunSummary> {
    let artifact = fetcher.fetch(coord, dest_dir).await?;

    let config = extract_config.clone();
    let path = artifact.clone();
    let records = tokio::task::spawn_blocking(move || extractor::extract(&path, &config))
        .await
        .map_err(|e| Error::Other(format!("extraction task panicked: {e}")))??;

    let records_loaded = sink.load(&records).await?;

    let summary = RunSummary {
        run_id: run_id.to_string(),
        hour_timestamp: records.first().map(|r| r.hour_timestamp),
        records_matched: records.len(),
        records_loaded,
    };
    tracing::info!(
        run_id,
        artifact = %artifact.display(),
        records_matched = summary.records_matched,
        records_loaded = summary.records_loaded,
        "hourly run complete"
    );

    if let Err(e) = notifier.notify(&summary).await {
        tracing::warn!(run_id, error = %e, "notification failed, run result unaffected");
    }

    Ok(summary)
}

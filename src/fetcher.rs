//! Resilient retrieval of hourly pageview dumps
//!
//! One [`PageviewFetcher::fetch`] call obtains exactly one remote artifact or
//! fails with a diagnosable error. The body is streamed to a dot-prefixed
//! temp file and atomically renamed into place, so a file observed at the
//! final path is always complete. Transient failures are retried with
//! exponential backoff; a 404 is permanent and aborts immediately.

use crate::config::FetchConfig;
use crate::error::{FetchError, Result};
use crate::retry::{IsTransient, backoff_delay};
use crate::types::HourCoordinate;
use futures::TryStreamExt;
use reqwest::StatusCode;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::io::StreamReader;

/// Downloads hourly pageview dumps from the archive
///
/// Holds a configured HTTP client; cheap to share across fetches. Concurrent
/// fetches are safe even for the same hour: each invocation streams into a
/// uniquely named temp file and publication is a single atomic rename.
#[derive(Debug, Clone)]
pub struct PageviewFetcher {
    config: FetchConfig,
    client: reqwest::Client,
}

impl PageviewFetcher {
    /// Create a fetcher with the given configuration
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Network`] if the HTTP client cannot be built.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(FetchError::Network)?;
        Ok(Self { config, client })
    }

    /// Fetch the dump for `coord` into `dest_dir`, returning the final path
    ///
    /// If a complete copy already exists and `force_redownload` is off, it is
    /// reused without a network call. Otherwise the remote artifact is
    /// streamed down with up to `retry.max_attempts` attempts, sleeping
    /// `backoff_multiplier ^ attempt` seconds between transient failures.
    ///
    /// # Errors
    ///
    /// - [`FetchError::NotFound`] — the dump does not exist (HTTP 404); never
    ///   retried.
    /// - [`FetchError::RetriesExhausted`] — every attempt failed transiently.
    /// - [`FetchError::StateConflict`] — a pre-existing file could not be
    ///   removed, or the completed download could not be moved into place.
    pub async fn fetch(&self, coord: &HourCoordinate, dest_dir: &Path) -> Result<PathBuf> {
        let url = coord.url(&self.config.base_url);
        let filename = coord.artifact_filename();

        tokio::fs::create_dir_all(dest_dir)
            .await
            .map_err(|e| FetchError::StateConflict {
                path: dest_dir.to_path_buf(),
                reason: format!("failed to create destination directory: {e}"),
            })?;

        let final_path = dest_dir.join(&filename);
        if final_path.exists() {
            if self.config.force_redownload {
                tracing::info!(path = %final_path.display(), "removing existing file before redownload");
                tokio::fs::remove_file(&final_path).await.map_err(|e| {
                    FetchError::StateConflict {
                        path: final_path.clone(),
                        reason: format!("failed to remove existing file: {e}"),
                    }
                })?;
            } else {
                tracing::info!(path = %final_path.display(), "file already exists, skipping download");
                return Ok(final_path);
            }
        }

        // Unique per-invocation temp name so concurrent fetches of the same
        // hour never share a partial file
        let nonce: u32 = rand::random();
        let temp_path = dest_dir.join(format!(".{filename}.{nonce:08x}.part"));

        let max_attempts = self.config.retry.max_attempts;
        for attempt in 1..=max_attempts {
            tracing::info!(attempt, max_attempts, url = %url, "downloading pageview dump");
            match self.attempt(&url, &temp_path).await {
                Ok(bytes) => {
                    self.publish(&temp_path, &final_path).await?;
                    tracing::info!(
                        path = %final_path.display(),
                        bytes,
                        attempt,
                        "download complete"
                    );
                    return Ok(final_path);
                }
                Err(e) if e.is_transient() => {
                    remove_temp(&temp_path).await;
                    if attempt < max_attempts {
                        let delay = backoff_delay(&self.config.retry, attempt);
                        tracing::warn!(
                            error = %e,
                            attempt,
                            max_attempts,
                            delay_secs = delay.as_secs_f64(),
                            "download attempt failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                    } else {
                        tracing::error!(error = %e, attempts = max_attempts, url = %url, "download failed after all attempts");
                        return Err(FetchError::RetriesExhausted {
                            url,
                            attempts: max_attempts,
                        }
                        .into());
                    }
                }
                Err(e) => {
                    remove_temp(&temp_path).await;
                    tracing::error!(error = %e, url = %url, "download failed with permanent error");
                    return Err(e.into());
                }
            }
        }

        // Only reachable with max_attempts == 0
        Err(FetchError::RetriesExhausted { url, attempts: 0 }.into())
    }

    /// One download attempt: stream the body to the temp path
    ///
    /// Returns the downloaded byte count. A zero-byte body is a failure so
    /// that truncated responses are retried rather than published.
    async fn attempt(&self, url: &str, temp_path: &Path) -> std::result::Result<u64, FetchError> {
        let response = self.client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                url: url.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(FetchError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let stream = response.bytes_stream().map_err(std::io::Error::other);
        let mut reader = StreamReader::new(stream);
        let file = tokio::fs::File::create(temp_path).await?;
        let mut writer = BufWriter::with_capacity(self.config.chunk_size, file);
        let bytes = tokio::io::copy_buf(&mut reader, &mut writer).await?;
        writer.flush().await?;

        if bytes == 0 {
            return Err(FetchError::EmptyDownload {
                url: url.to_string(),
            });
        }
        Ok(bytes)
    }

    /// Atomically move the completed temp file to the final path
    ///
    /// The rename is the sole publication point: a reader can never observe
    /// a half-written file under the final name.
    async fn publish(&self, temp_path: &Path, final_path: &Path) -> std::result::Result<(), FetchError> {
        // A file that appeared here since the precondition check is stale;
        // replace it
        if final_path.exists() {
            if let Err(e) = tokio::fs::remove_file(final_path).await {
                remove_temp(temp_path).await;
                return Err(FetchError::StateConflict {
                    path: final_path.to_path_buf(),
                    reason: format!("failed to remove file occupying final path: {e}"),
                });
            }
        }
        if let Err(e) = tokio::fs::rename(temp_path, final_path).await {
            remove_temp(temp_path).await;
            return Err(FetchError::StateConflict {
                path: final_path.to_path_buf(),
                reason: format!("failed to move completed download into place: {e}"),
            });
        }
        Ok(())
    }
}

/// Best-effort removal of a partial temp file
async fn remove_temp(temp_path: &Path) {
    if let Err(e) = tokio::fs::remove_file(temp_path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::debug!(path = %temp_path.display(), error = %e, "could not remove temp file");
        }
    }
}

//! Configuration types for pageviews-dl

use crate::types::MatchMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default base URL for the public Wikimedia pageview archive
pub const DEFAULT_BASE_URL: &str = "https://dumps.wikimedia.org/other/pageviews";

/// Fetch behavior configuration (endpoint, timeout, streaming, retries)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Base URL of the pageview archive (default: the public Wikimedia dumps
    /// host). Overridable for mirrors and tests.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Hard timeout per download attempt (default: 30 seconds)
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// Buffered write size while streaming the body to disk (default: 64 KiB)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Replace a pre-existing local copy instead of reusing it (default: true)
    #[serde(default = "default_true")]
    pub force_redownload: bool,

    /// Retry behavior for transient failures
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
            chunk_size: default_chunk_size(),
            force_redownload: true,
            retry: RetryConfig::default(),
        }
    }
}

/// Retry configuration for transient fetch failures
///
/// The delay before attempt `n + 1` is `backoff_multiplier ^ n` seconds,
/// capped at `max_delay`. No jitter is applied: the backoff sequence is
/// deterministic so callers can reason about worst-case run time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of download attempts (default: 5)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Multiplier for exponential backoff (default: 1.5)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Cap on any single backoff delay (default: 1 hour)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_multiplier: default_backoff_multiplier(),
            max_delay: default_max_delay(),
        }
    }
}

/// Extraction configuration (watchlist, match policy, strictness)
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Entity names to match page titles against
    #[serde(default)]
    pub watchlist: Vec<String>,

    /// Matching policy (default: exact)
    #[serde(default)]
    pub match_mode: MatchMode,

    /// Fail extraction when the artifact filename does not encode an hour,
    /// instead of falling back to the current time (default: false)
    #[serde(default)]
    pub require_hour_in_name: bool,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_chunk_size() -> usize {
    64 * 1024
}

fn default_true() -> bool {
    true
}

fn default_max_attempts() -> u32 {
    5
}

fn default_backoff_multiplier() -> f64 {
    1.5
}

fn default_max_delay() -> Duration {
    Duration::from_secs(3600)
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

//! End-to-end pipeline test: mock archive → fetch → extract → sink → notify.

use async_trait::async_trait;
use flate2::Compression;
use flate2::write::GzEncoder;
use pageviews_dl::{
    ExtractConfig, FetchConfig, HourCoordinate, MatchMode, MatchedRecord, NoOpNotifier, Notifier,
    PageviewFetcher, RecordSink, Result, RetryConfig, RunSummary, run_hourly,
};
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Sink that persists each batch as JSON lines, exercising the loader key
/// contract end to end
#[derive(Default)]
struct JsonSink {
    rows: Mutex<Vec<String>>,
}

#[async_trait]
impl RecordSink for JsonSink {
    async fn load(&self, records: &[MatchedRecord]) -> Result<u64> {
        let mut rows = self.rows.lock().unwrap();
        for record in records {
            rows.push(serde_json::to_string(record)?);
        }
        Ok(records.len() as u64)
    }
}

/// Notifier that captures the summary it was handed
#[derive(Default)]
struct CapturingNotifier {
    summaries: Mutex<Vec<RunSummary>>,
}

#[async_trait]
impl Notifier for CapturingNotifier {
    async fn notify(&self, summary: &RunSummary) -> Result<()> {
        self.summaries.lock().unwrap().push(summary.clone());
        Ok(())
    }
}

fn gzipped(content: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

#[tokio::test]
async fn run_hourly_fetches_extracts_loads_and_notifies() {
    let server = MockServer::start().await;
    let body = gzipped("en Amazon 10 500\nen NotAMatch 3 100\nmalformed line\nen Apple 4 250\n");
    Mock::given(method("GET"))
        .and(path("/pageviews/2025/2025-06/pageviews-20250615-140000.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let fetcher = PageviewFetcher::new(FetchConfig {
        base_url: format!("{}/pageviews", server.uri()),
        retry: RetryConfig {
            max_attempts: 2,
            backoff_multiplier: 0.1,
            max_delay: Duration::from_secs(1),
        },
        ..Default::default()
    })
    .unwrap();

    let extract_config = ExtractConfig {
        watchlist: vec!["Amazon".to_string(), "Apple".to_string()],
        match_mode: MatchMode::Exact,
        ..Default::default()
    };

    let sink = JsonSink::default();
    let notifier = CapturingNotifier::default();
    let coord = HourCoordinate::new(2025, 6, 15, 14).unwrap();

    let summary = run_hourly(
        &fetcher,
        &extract_config,
        &coord,
        dir.path(),
        "manual-2025-06-15T14",
        &sink,
        &notifier,
    )
    .await
    .unwrap();

    assert_eq!(summary.run_id, "manual-2025-06-15T14");
    assert_eq!(summary.records_matched, 2);
    assert_eq!(summary.records_loaded, 2);
    assert_eq!(
        summary.hour_timestamp.unwrap().to_string(),
        "2025-06-15 14:00:00"
    );

    // Artifact left in place for the caller to clean up
    assert!(dir.path().join("pageviews-20250615-140000.gz").exists());

    // Every persisted row carries exactly the loader contract keys
    let rows = sink.rows.lock().unwrap();
    assert_eq!(rows.len(), 2);
    for row in rows.iter() {
        let value: serde_json::Value = serde_json::from_str(row).unwrap();
        let obj = value.as_object().unwrap();
        for key in [
            "domain",
            "page_title",
            "view_count",
            "response_size",
            "hour_timestamp",
        ] {
            assert!(obj.contains_key(key), "missing key {key} in {row}");
        }
        assert_eq!(obj.len(), 5);
    }

    let summaries = notifier.summaries.lock().unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0], summary);
}

#[tokio::test]
async fn fetch_failure_aborts_the_run_before_the_sink() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let fetcher = PageviewFetcher::new(FetchConfig {
        base_url: format!("{}/pageviews", server.uri()),
        ..Default::default()
    })
    .unwrap();

    let sink = JsonSink::default();
    let coord = HourCoordinate::new(2025, 6, 15, 14).unwrap();
    let result = run_hourly(
        &fetcher,
        &ExtractConfig::default(),
        &coord,
        dir.path(),
        "run-404",
        &sink,
        &NoOpNotifier,
    )
    .await;

    assert!(result.is_err());
    assert!(sink.rows.lock().unwrap().is_empty());
}

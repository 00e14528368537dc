//! Streaming extraction of watchlist matches from a compressed dump
//!
//! The artifact is consumed as a lazy, single-pass line stream over a
//! decompressing reader — the decompressed content is never held in memory
//! at once. Malformed lines are routine and skipped; a decompression or read
//! failure is fatal for the whole call and no partial results are returned.

use crate::config::ExtractConfig;
use crate::error::{Error, Result};
use crate::types::{MatchedRecord, PageviewRecord};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use flate2::read::MultiGzDecoder;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

/// Expected artifact naming pattern: `pageviews-YYYYMMDD-HH0000.gz`
#[allow(clippy::expect_used)]
static HOUR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^pageviews-(\d{8})-(\d{2})0000\.gz$").expect("hour pattern is a valid regex")
});

/// Recover the hour timestamp encoded in the artifact filename
fn hour_from_filename(path: &Path) -> Option<NaiveDateTime> {
    let name = path.file_name()?.to_str()?;
    let caps = HOUR_PATTERN.captures(name)?;
    let date = NaiveDate::parse_from_str(&caps[1], "%Y%m%d").ok()?;
    let hour: u32 = caps[2].parse().ok()?;
    date.and_hms_opt(hour, 0, 0)
}

/// Finite, single-pass iterator over decompressed text lines
///
/// Invalid UTF-8 bytes are replaced lossily rather than failing the line;
/// the upstream dumps occasionally carry mojibake titles. Not restartable —
/// re-extracting means re-opening the artifact.
struct LineIter<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> LineIter<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> Iterator for LineIter<R> {
    type Item = std::io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                while matches!(self.buf.last(), Some(b'\n' | b'\r')) {
                    self.buf.pop();
                }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// Extract all watchlist matches from a compressed pageview artifact
///
/// Streams the gzip artifact line by line, parses each line into a
/// [`PageviewRecord`], filters by the configured match policy, and stamps
/// every match with the hour recovered from the filename. Output preserves
/// file order, and re-invoking on the same artifact yields an identical
/// sequence.
///
/// When the filename does not match `pageviews-YYYYMMDD-HH0000.gz`, records
/// are stamped with the current time instead; this degradation is logged at
/// warn level, and [`ExtractConfig::require_hour_in_name`] turns it into a
/// hard error.
///
/// # Errors
///
/// - [`Error::CorruptArtifact`] — the artifact is unreadable or the gzip
///   stream is corrupt; no partial record list is returned.
/// - [`Error::HourNotInFilename`] — the filename encodes no hour and strict
///   mode is on.
pub fn extract(path: &Path, config: &ExtractConfig) -> Result<Vec<MatchedRecord>> {
    let hour_timestamp = match hour_from_filename(path) {
        Some(ts) => ts,
        None => {
            if config.require_hour_in_name {
                return Err(Error::HourNotInFilename {
                    path: path.to_path_buf(),
                });
            }
            let now = Utc::now().naive_utc();
            tracing::warn!(
                path = %path.display(),
                fallback = %now,
                "artifact filename does not encode an hour, stamping records with current time"
            );
            now
        }
    };

    let file = File::open(path).map_err(|e| corrupt(path, &e))?;
    let decoder = MultiGzDecoder::new(BufReader::new(file));
    let lines = LineIter::new(BufReader::new(decoder));

    let mut matches = Vec::new();
    let mut lines_scanned: u64 = 0;
    let mut lines_skipped: u64 = 0;
    for line in lines {
        let line = line.map_err(|e| corrupt(path, &e))?;
        lines_scanned += 1;
        let Some(record) = PageviewRecord::parse_line(&line) else {
            lines_skipped += 1;
            continue;
        };
        if config.match_mode.matches(&record.page_title, &config.watchlist) {
            matches.push(MatchedRecord {
                record,
                hour_timestamp,
            });
        }
    }

    tracing::debug!(
        path = %path.display(),
        lines_scanned,
        lines_skipped,
        matched = matches.len(),
        "extraction complete"
    );
    Ok(matches)
}

fn corrupt(path: &Path, e: &std::io::Error) -> Error {
    Error::CorruptArtifact {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

//! Core types: hour coordinates, pageview records, and match policy

use crate::error::{Error, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Identifies exactly one hourly pageview dump
///
/// Immutable once constructed; the remote URL and the local filename are both
/// derived from the same zero-padded formatting, so the two can never
/// diverge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HourCoordinate {
    /// Four-digit year
    pub year: u16,
    /// Month (1-12)
    pub month: u8,
    /// Day of month (1-31)
    pub day: u8,
    /// Hour of day (0-23)
    pub hour: u8,
}

impl HourCoordinate {
    /// Create a validated hour coordinate
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCoordinate`] if any field is out of range.
    pub fn new(year: u16, month: u8, day: u8, hour: u8) -> Result<Self> {
        if year > 9999 {
            return Err(Error::InvalidCoordinate {
                message: format!("year {year} exceeds 4 digits"),
            });
        }
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidCoordinate {
                message: format!("month {month} not in 1..=12"),
            });
        }
        if !(1..=31).contains(&day) {
            return Err(Error::InvalidCoordinate {
                message: format!("day {day} not in 1..=31"),
            });
        }
        if hour > 23 {
            return Err(Error::InvalidCoordinate {
                message: format!("hour {hour} not in 0..=23"),
            });
        }
        Ok(Self {
            year,
            month,
            day,
            hour,
        })
    }

    /// Zero-padded `YYYYMMDD-HH0000` stamp shared by the URL and the filename
    fn stamp(&self) -> String {
        format!(
            "{:04}{:02}{:02}-{:02}0000",
            self.year, self.month, self.day, self.hour
        )
    }

    /// Final local filename: `pageviews-YYYYMMDD-HH0000.gz`
    pub fn artifact_filename(&self) -> String {
        format!("pageviews-{}.gz", self.stamp())
    }

    /// Remote URL under `base_url`:
    /// `<base>/<YYYY>/<YYYY>-<MM>/pageviews-<YYYYMMDD>-<HH>0000.gz`
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}/{:04}/{:04}-{:02}/{}",
            base_url.trim_end_matches('/'),
            self.year,
            self.year,
            self.month,
            self.artifact_filename()
        )
    }
}

/// One parsed pageview line: four whitespace-separated fields
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageviewRecord {
    /// Wiki domain code (e.g., "en", "de.m")
    pub domain: String,
    /// Page title, underscores for spaces per the dump format
    pub page_title: String,
    /// Number of views in the hour
    pub view_count: u64,
    /// Total response bytes served
    pub response_size: u64,
}

impl PageviewRecord {
    /// Parse one decompressed line into a record
    ///
    /// Returns `None` for lines with fewer than four tokens or whose count
    /// fields are not non-negative integers. Malformed lines are routine in
    /// the upstream data and are skipped, not reported.
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let domain = parts.next()?;
        let page_title = parts.next()?;
        let view_count = parts.next()?.parse().ok()?;
        let response_size = parts.next()?.parse().ok()?;
        Some(Self {
            domain: domain.to_string(),
            page_title: page_title.to_string(),
            view_count,
            response_size,
        })
    }
}

/// A watchlist match, stamped with the artifact's logical hour
///
/// Serializes flat with exactly the keys the downstream loader contract
/// expects: `domain, page_title, view_count, response_size, hour_timestamp`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchedRecord {
    /// The matched pageview record
    #[serde(flatten)]
    pub record: PageviewRecord,
    /// Hour the artifact covers (UTC wall time, from the filename)
    pub hour_timestamp: NaiveDateTime,
}

/// Watchlist matching policy
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Title equals a watchlist entry verbatim, or equals the entry with its
    /// spaces substituted by underscores (the dump's space encoding)
    #[default]
    Exact,
    /// Lowercased title contains any lowercased watchlist entry
    Contains,
}

impl MatchMode {
    /// Test a page title against the watchlist under this policy
    pub fn matches(&self, title: &str, watchlist: &[String]) -> bool {
        match self {
            MatchMode::Exact => watchlist
                .iter()
                .any(|entry| title == entry || title == entry.replace(' ', "_")),
            MatchMode::Contains => {
                let title_lower = title.to_lowercase();
                watchlist
                    .iter()
                    .any(|entry| title_lower.contains(&entry.to_lowercase()))
            }
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_and_filename_share_the_same_stamp() {
        let coord = HourCoordinate::new(2025, 6, 5, 3).unwrap();
        let url = coord.url("https://dumps.wikimedia.org/other/pageviews");
        let filename = coord.artifact_filename();

        assert_eq!(filename, "pageviews-20250605-030000.gz");
        assert_eq!(
            url,
            "https://dumps.wikimedia.org/other/pageviews/2025/2025-06/pageviews-20250605-030000.gz"
        );
        // The filename embedded in the URL is the local filename, verbatim
        assert!(url.ends_with(&filename));
    }

    #[test]
    fn url_zero_pads_all_fields() {
        let coord = HourCoordinate::new(999, 1, 2, 0).unwrap();
        assert_eq!(coord.artifact_filename(), "pageviews-09990102-000000.gz");
        let url = coord.url("http://host/base/");
        assert_eq!(url, "http://host/base/0999/0999-01/pageviews-09990102-000000.gz");
    }

    #[test]
    fn coordinate_validation_rejects_out_of_range_fields() {
        assert!(HourCoordinate::new(2025, 0, 1, 0).is_err());
        assert!(HourCoordinate::new(2025, 13, 1, 0).is_err());
        assert!(HourCoordinate::new(2025, 1, 0, 0).is_err());
        assert!(HourCoordinate::new(2025, 1, 32, 0).is_err());
        assert!(HourCoordinate::new(2025, 1, 1, 24).is_err());
        assert!(HourCoordinate::new(2025, 12, 31, 23).is_ok());
    }

    #[test]
    fn parse_line_accepts_four_tokens() {
        let record = PageviewRecord::parse_line("en Amazon 10 500").unwrap();
        assert_eq!(record.domain, "en");
        assert_eq!(record.page_title, "Amazon");
        assert_eq!(record.view_count, 10);
        assert_eq!(record.response_size, 500);
    }

    #[test]
    fn parse_line_takes_first_four_of_extra_tokens() {
        let record = PageviewRecord::parse_line("en Amazon 10 500 trailing junk").unwrap();
        assert_eq!(record.view_count, 10);
        assert_eq!(record.response_size, 500);
    }

    #[test]
    fn parse_line_rejects_short_or_non_numeric_lines() {
        assert!(PageviewRecord::parse_line("malformed line").is_none());
        assert!(PageviewRecord::parse_line("en Amazon ten 500").is_none());
        assert!(PageviewRecord::parse_line("en Amazon 10 -500").is_none());
        assert!(PageviewRecord::parse_line("").is_none());
    }

    #[test]
    fn exact_mode_matches_verbatim_and_space_encoded_entries() {
        let watchlist = vec!["Amazon".to_string(), "New York".to_string()];
        assert!(MatchMode::Exact.matches("Amazon", &watchlist));
        assert!(MatchMode::Exact.matches("New_York", &watchlist));
        assert!(!MatchMode::Exact.matches("Amazon_Inc", &watchlist));
        assert!(!MatchMode::Exact.matches("amazon", &watchlist));
    }

    #[test]
    fn contains_mode_is_case_insensitive_substring() {
        let watchlist = vec!["amazon".to_string()];
        assert!(MatchMode::Contains.matches("Amazon", &watchlist));
        assert!(MatchMode::Contains.matches("Amazon_Inc", &watchlist));
        assert!(!MatchMode::Contains.matches("Apple", &watchlist));
    }

    #[test]
    fn matched_record_serializes_with_loader_contract_keys() {
        let record = MatchedRecord {
            record: PageviewRecord {
                domain: "en".to_string(),
                page_title: "Amazon".to_string(),
                view_count: 10,
                response_size: 500,
            },
            hour_timestamp: chrono::NaiveDate::from_ymd_opt(2025, 6, 15)
                .unwrap()
                .and_hms_opt(14, 0, 0)
                .unwrap(),
        };
        let json = serde_json::to_value(&record).unwrap();
        let obj = json.as_object().unwrap();
        let mut keys: Vec<_> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "domain",
                "hour_timestamp",
                "page_title",
                "response_size",
                "view_count"
            ]
        );
        assert_eq!(obj["hour_timestamp"], "2025-06-15T14:00:00");
    }
}

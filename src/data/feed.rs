//! Feed acquisition and parsing: fetch the raw county CSV and type it into
//! case records. Malformed rows are skipped and counted rather than fatal,
//! unless the skipped fraction exceeds the configured tolerance.

use std::fmt;
use std::fs;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;

use crate::data::record::CaseRecord;

const FEED_HEADER: [&str; 6] = ["date", "county", "state", "fips", "cases", "deaths"];

#[derive(Debug)]
pub enum LoadError {
    /// The feed could not be fetched (network/IO failure or HTTP error).
    SourceUnavailable(String),
    /// The feed arrived but is not usable as a dataset.
    DatasetCorrupt(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceUnavailable(message) => write!(f, "source unavailable: {message}"),
            Self::DatasetCorrupt(message) => write!(f, "dataset corrupt: {message}"),
        }
    }
}

impl std::error::Error for LoadError {}

/// A data row that failed typing, with its feed line number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub line: u64,
    pub reason: String,
}

/// Per-load statistics, kept on the snapshot for status display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub source: String,
    pub total_rows: usize,
    pub accepted: usize,
    pub unknown_county_rows: usize,
    pub skipped: Vec<SkippedRow>,
}

impl LoadReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Fetch the raw feed text. http(s) URIs go through the HTTP client with a
/// bounded timeout; anything else is read as a filesystem path, so tests and
/// offline runs never touch the network.
pub fn fetch_source(source: &str, timeout: Duration) -> Result<String, LoadError> {
    if source.starts_with("http://") || source.starts_with("https://") {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| LoadError::SourceUnavailable(err.to_string()))?;
        let response = client
            .get(source)
            .send()
            .map_err(|err| LoadError::SourceUnavailable(err.to_string()))?;
        if !response.status().is_success() {
            return Err(LoadError::SourceUnavailable(format!(
                "{source}: HTTP {}",
                response.status()
            )));
        }
        response
            .text()
            .map_err(|err| LoadError::SourceUnavailable(err.to_string()))
    } else {
        fs::read_to_string(source)
            .map_err(|err| LoadError::SourceUnavailable(format!("{source}: {err}")))
    }
}

/// Parse feed CSV into records. Rows with `county == "Unknown"` are dropped
/// as cleaning, not counted as malformed. Rows that fail typing are skipped
/// and counted; the load fails `DatasetCorrupt` only when the skipped
/// fraction exceeds `tolerance` (0.0..=1.0).
pub fn parse_feed(
    source: &str,
    csv_text: &str,
    tolerance: f64,
) -> Result<(Vec<CaseRecord>, LoadReport), LoadError> {
    let mut reader = csv::Reader::from_reader(csv_text.as_bytes());

    let header = reader
        .headers()
        .map_err(|err| LoadError::DatasetCorrupt(format!("unreadable header: {err}")))?;
    if header.iter().map(str::trim).ne(FEED_HEADER.iter().copied()) {
        return Err(LoadError::DatasetCorrupt(format!(
            "unexpected feed header: {header:?}"
        )));
    }

    let mut report = LoadReport {
        source: source.to_string(),
        ..LoadReport::default()
    };
    let mut records = Vec::new();

    for result in reader.records() {
        report.total_rows += 1;
        let row = match result {
            Ok(row) => row,
            Err(err) => {
                report.skipped.push(SkippedRow {
                    line: err.position().map(|p| p.line()).unwrap_or(0),
                    reason: err.to_string(),
                });
                continue;
            }
        };
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        match record_from_row(&row) {
            Ok(record) => {
                if record.county == "Unknown" {
                    report.unknown_county_rows += 1;
                } else {
                    records.push(record);
                }
            }
            Err(reason) => report.skipped.push(SkippedRow { line, reason }),
        }
    }

    let skipped = report.skipped.len();
    if report.total_rows > 0 && skipped as f64 / report.total_rows as f64 > tolerance {
        return Err(LoadError::DatasetCorrupt(format!(
            "skipped {skipped} of {} rows (tolerance {tolerance})",
            report.total_rows
        )));
    }

    report.accepted = records.len();
    Ok((records, report))
}

fn record_from_row(row: &csv::StringRecord) -> Result<CaseRecord, String> {
    let date_raw = row.get(0).ok_or("missing date column")?.trim();
    let date = NaiveDate::parse_from_str(date_raw, "%Y-%m-%d")
        .map_err(|err| format!("bad date '{date_raw}': {err}"))?;
    let county = row.get(1).ok_or("missing county column")?.trim();
    let state = row.get(2).ok_or("missing state column")?.trim();
    if county.is_empty() {
        return Err("empty county".to_string());
    }
    if state.is_empty() {
        return Err("empty state".to_string());
    }
    let fips = row.get(3).unwrap_or("").trim().to_string();
    let cases = parse_count(row.get(4), "cases")?;
    let deaths = parse_count(row.get(5), "deaths")?;
    Ok(CaseRecord {
        date,
        county: county.to_string(),
        state: state.to_string(),
        fips,
        cases,
        deaths,
    })
}

fn parse_count(raw: Option<&str>, column: &str) -> Result<u64, String> {
    let raw = raw
        .ok_or_else(|| format!("missing {column} column"))?
        .trim();
    raw.parse::<u64>()
        .map_err(|_| format!("non-numeric {column} '{raw}'"))
}

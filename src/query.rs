//! Query layer: per-region time series over an inclusive date window with a
//! derived mortality rate, evaluated against one consistent snapshot. Each
//! call produces its own result structure; shared state is never mutated.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::data::record::RegionKey;
use crate::data::snapshot::DatasetSnapshot;
use crate::data::store::DatasetStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    pub cases: u64,
    pub deaths: u64,
    /// deaths / cases; None when cases is 0. Consumers render a gap, not a
    /// zero.
    pub mortality_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeSeriesResult {
    pub points: Vec<TimeSeriesPoint>,
}

impl TimeSeriesResult {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(Debug)]
pub enum QueryError {
    /// Caller supplied a window with start after end.
    InvalidRange { start: NaiveDate, end: NaiveDate },
    /// No successful load has happened yet.
    NotYetLoaded,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRange { start, end } => {
                write!(f, "invalid range: start {start} is after end {end}")
            }
            Self::NotYetLoaded => write!(f, "dataset not loaded yet"),
        }
    }
}

impl std::error::Error for QueryError {}

pub fn mortality_rate(cases: u64, deaths: u64) -> Option<f64> {
    if cases == 0 {
        None
    } else {
        Some(deaths as f64 / cases as f64)
    }
}

/// Evaluate a window query against one snapshot. Keys matching no records
/// yield empty results — unknown or not-yet-reported regions are normal.
pub fn query_snapshot(
    snapshot: &DatasetSnapshot,
    keys: &[RegionKey],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<HashMap<RegionKey, TimeSeriesResult>, QueryError> {
    if start > end {
        return Err(QueryError::InvalidRange { start, end });
    }
    let mut results = HashMap::with_capacity(keys.len());
    for key in keys {
        let points = snapshot
            .region_window(key, start, end)
            .into_iter()
            .map(|record| TimeSeriesPoint {
                date: record.date,
                cases: record.cases,
                deaths: record.deaths,
                mortality_rate: mortality_rate(record.cases, record.deaths),
            })
            .collect();
        results.insert(key.clone(), TimeSeriesResult { points });
    }
    Ok(results)
}

/// Capture the store's current snapshot once and evaluate against it, so a
/// refresh landing mid-query can never mix old and new data. The range is
/// validated before the snapshot is touched.
pub fn query(
    store: &DatasetStore,
    keys: &[RegionKey],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<HashMap<RegionKey, TimeSeriesResult>, QueryError> {
    if start > end {
        return Err(QueryError::InvalidRange { start, end });
    }
    let snapshot = store.current().map_err(|_| QueryError::NotYetLoaded)?;
    query_snapshot(&snapshot, keys, start, end)
}

//! Immutable dataset snapshots: the full record collection at one point in
//! time, a per-region date index, the refresh timestamp, and the load
//! report. Published snapshots are never mutated; refresh builds a new one.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};

use crate::data::feed::LoadReport;
use crate::data::record::{CaseRecord, RegionKey};

#[derive(Debug)]
pub struct DatasetSnapshot {
    records: Vec<CaseRecord>,
    /// Record indices per region, date ascending.
    by_region: HashMap<RegionKey, Vec<usize>>,
    refreshed_at: DateTime<Utc>,
    report: LoadReport,
}

impl DatasetSnapshot {
    /// Build from parsed records. The feed promises one row per
    /// (date, county, state); when it lies, the last row wins — the feed is
    /// cumulative and append-only, so later rows supersede earlier ones.
    pub fn build(
        records: Vec<CaseRecord>,
        report: LoadReport,
        refreshed_at: DateTime<Utc>,
    ) -> Self {
        let mut last_for_key: HashMap<(NaiveDate, RegionKey), usize> =
            HashMap::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            last_for_key.insert((record.date, record.region_key()), idx);
        }
        let keep: HashSet<usize> = last_for_key.into_values().collect();

        let records: Vec<CaseRecord> = records
            .into_iter()
            .enumerate()
            .filter_map(|(idx, record)| keep.contains(&idx).then_some(record))
            .collect();

        let mut by_region: HashMap<RegionKey, Vec<usize>> = HashMap::new();
        for (idx, record) in records.iter().enumerate() {
            by_region.entry(record.region_key()).or_default().push(idx);
        }
        for indices in by_region.values_mut() {
            indices.sort_by_key(|&idx| records[idx].date);
        }

        DatasetSnapshot {
            records,
            by_region,
            refreshed_at,
            report,
        }
    }

    pub fn records(&self) -> &[CaseRecord] {
        &self.records
    }

    pub fn refreshed_at(&self) -> DateTime<Utc> {
        self.refreshed_at
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn region_count(&self) -> usize {
        self.by_region.len()
    }

    pub fn has_region(&self, key: &RegionKey) -> bool {
        self.by_region.contains_key(key)
    }

    pub fn regions(&self) -> impl Iterator<Item = &RegionKey> {
        self.by_region.keys()
    }

    /// Records for one region within the inclusive window, date ascending.
    /// Empty when the region is absent — that is a normal occurrence.
    pub fn region_window(
        &self,
        key: &RegionKey,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<&CaseRecord> {
        let Some(indices) = self.by_region.get(key) else {
            return Vec::new();
        };
        let lo = indices.partition_point(|&idx| self.records[idx].date < start);
        let hi = indices.partition_point(|&idx| self.records[idx].date <= end);
        indices[lo..hi].iter().map(|&idx| &self.records[idx]).collect()
    }
}

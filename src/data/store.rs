//! Dataset store: owns the published snapshot and its refresh lifecycle.
//! Load is a pure transform (source → snapshot); refresh swaps the published
//! Arc on success only, so a failed fetch never disturbs data being served.

use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::config::AppConfig;
use crate::data::catalog::{build_catalog, load_city_aliases, CityAlias, RegionCatalog};
use crate::data::feed::{fetch_source, parse_feed, LoadError};
use crate::data::snapshot::DatasetSnapshot;

#[derive(Debug)]
pub enum StoreError {
    Load(LoadError),
    /// No successful load has happened yet.
    NotYetLoaded,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(err) => write!(f, "{err}"),
            Self::NotYetLoaded => write!(f, "dataset not loaded yet"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Load(err) => Some(err),
            Self::NotYetLoaded => None,
        }
    }
}

impl From<LoadError> for StoreError {
    fn from(err: LoadError) -> Self {
        Self::Load(err)
    }
}

/// Fetch a source and build a snapshot: the pure half of a refresh. Owns no
/// state and publishes nothing, so ingestion is testable without a store.
pub fn load_dataset(
    source: &str,
    timeout: Duration,
    tolerance: f64,
) -> Result<DatasetSnapshot, LoadError> {
    let text = fetch_source(source, timeout)?;
    let (records, report) = parse_feed(source, &text, tolerance)?;
    Ok(DatasetSnapshot::build(records, report, Utc::now()))
}

pub struct DatasetStore {
    config: AppConfig,
    aliases: Vec<CityAlias>,
    /// The published snapshot. Queries clone the Arc and drop the lock, so
    /// a concurrent refresh sees either the fully-old or fully-new dataset.
    snapshot: RwLock<Option<Arc<DatasetSnapshot>>>,
}

impl DatasetStore {
    /// A missing or unreadable alias table degrades to no aliases; the
    /// catalog still lists every region in the feed.
    pub fn new(config: AppConfig) -> Self {
        let aliases = config
            .city_aliases_path
            .as_deref()
            .and_then(|path| load_city_aliases(path).ok())
            .unwrap_or_default();
        DatasetStore {
            config,
            aliases,
            snapshot: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Pure load against the configured source; `refresh` does the swap.
    pub fn load_snapshot(&self) -> Result<DatasetSnapshot, LoadError> {
        load_dataset(
            &self.config.source,
            self.config.fetch_timeout,
            self.config.malformed_tolerance,
        )
    }

    /// Fetch, rebuild, and atomically publish. On failure the previously
    /// published snapshot — timestamp included — is left untouched.
    pub fn refresh(&self) -> Result<Arc<DatasetSnapshot>, StoreError> {
        let snapshot = Arc::new(self.load_snapshot()?);
        let mut slot = write_slot(&self.snapshot);
        *slot = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// The latest successfully loaded snapshot.
    pub fn current(&self) -> Result<Arc<DatasetSnapshot>, StoreError> {
        read_slot(&self.snapshot)
            .clone()
            .ok_or(StoreError::NotYetLoaded)
    }

    /// Timestamp of the last successful refresh, for "last updated" display.
    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        read_slot(&self.snapshot)
            .as_ref()
            .map(|snapshot| snapshot.refreshed_at())
    }

    /// Distinct regions of the current snapshot with display labels,
    /// alias entries included.
    pub fn region_catalog(&self) -> Result<RegionCatalog, StoreError> {
        let snapshot = self.current()?;
        Ok(build_catalog(&snapshot, &self.aliases))
    }
}

type Slot = RwLock<Option<Arc<DatasetSnapshot>>>;

// The lock only guards pointer assignment; a poisoned lock still holds a
// valid slot, so recover the guard instead of propagating the panic.
fn read_slot(slot: &Slot) -> std::sync::RwLockReadGuard<'_, Option<Arc<DatasetSnapshot>>> {
    match slot.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write_slot(slot: &Slot) -> std::sync::RwLockWriteGuard<'_, Option<Arc<DatasetSnapshot>>> {
    match slot.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

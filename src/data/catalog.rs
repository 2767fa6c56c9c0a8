//! Region catalog: the distinct (county, state) pairs of a snapshot with
//! display labels, enriched by the static city-alias table (the
//! population-rank lookup consumed as configuration, not re-derived here).

use std::fs;

use serde::{Deserialize, Serialize};

use crate::data::record::{is_independent_city, RegionKey};
use crate::data::snapshot::DatasetSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub key: RegionKey,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegionCatalog {
    pub entries: Vec<CatalogEntry>,
}

impl RegionCatalog {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &RegionKey) -> bool {
        self.entries.iter().any(|entry| &entry.key == key)
    }
}

/// One row of the static population-rank lookup: a populous city and the
/// county whose series it selects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityAlias {
    pub city: String,
    pub county: String,
    pub state: String,
}

pub fn load_city_aliases(path: &str) -> Result<Vec<CityAlias>, std::io::Error> {
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(std::io::Error::other)
}

/// Derive the catalog from a snapshot: one entry per distinct region, plus
/// one per alias whose county is present in the snapshot. Aliases naming an
/// independent city are ignored — those names are already labeled as cities.
pub fn build_catalog(snapshot: &DatasetSnapshot, aliases: &[CityAlias]) -> RegionCatalog {
    let mut entries: Vec<CatalogEntry> = snapshot
        .regions()
        .map(|key| CatalogEntry {
            key: key.clone(),
            label: key.display_label(),
        })
        .collect();

    for alias in aliases {
        if is_independent_city(&alias.city) {
            continue;
        }
        let key = RegionKey::new(alias.county.clone(), alias.state.clone());
        if !snapshot.has_region(&key) {
            continue;
        }
        entries.push(CatalogEntry {
            key,
            label: format!("{}, {}", alias.city, alias.state),
        });
    }

    entries.sort_by(|a, b| {
        (&a.key.state, &a.key.county, &a.label).cmp(&(&b.key.state, &b.key.county, &b.label))
    });
    RegionCatalog { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::feed::LoadReport;
    use crate::data::record::CaseRecord;
    use chrono::{NaiveDate, Utc};

    fn snapshot_with(regions: &[(&str, &str)]) -> DatasetSnapshot {
        let records = regions
            .iter()
            .map(|(county, state)| CaseRecord {
                date: NaiveDate::parse_from_str("2020-03-01", "%Y-%m-%d")
                    .expect("test date should parse"),
                county: county.to_string(),
                state: state.to_string(),
                fips: String::new(),
                cases: 1,
                deaths: 0,
            })
            .collect();
        DatasetSnapshot::build(records, LoadReport::default(), Utc::now())
    }

    #[test]
    fn labels_counties_and_independent_cities() {
        let snapshot = snapshot_with(&[("Bergen", "New Jersey"), ("New York City", "New York")]);
        let catalog = build_catalog(&snapshot, &[]);
        let labels: Vec<_> = catalog.entries.iter().map(|e| e.label.as_str()).collect();
        assert!(labels.contains(&"Bergen County, New Jersey"));
        assert!(labels.contains(&"New York City, New York"));
    }

    #[test]
    fn alias_adds_city_entry_selecting_the_county() {
        let snapshot = snapshot_with(&[("Bergen", "New Jersey")]);
        let aliases = vec![CityAlias {
            city: "Hackensack".to_string(),
            county: "Bergen".to_string(),
            state: "New Jersey".to_string(),
        }];
        let catalog = build_catalog(&snapshot, &aliases);
        let entry = catalog
            .entries
            .iter()
            .find(|e| e.label == "Hackensack, New Jersey")
            .expect("alias entry should exist");
        assert_eq!(entry.key, RegionKey::new("Bergen", "New Jersey"));
    }

    #[test]
    fn alias_for_absent_county_is_ignored() {
        let snapshot = snapshot_with(&[("Bergen", "New Jersey")]);
        let aliases = vec![CityAlias {
            city: "Seattle".to_string(),
            county: "King".to_string(),
            state: "Washington".to_string(),
        }];
        let catalog = build_catalog(&snapshot, &aliases);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn alias_naming_an_independent_city_is_ignored() {
        let snapshot = snapshot_with(&[("New York City", "New York")]);
        let aliases = vec![CityAlias {
            city: "New York City".to_string(),
            county: "New York City".to_string(),
            state: "New York".to_string(),
        }];
        let catalog = build_catalog(&snapshot, &aliases);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.entries[0].label, "New York City, New York");
    }

    #[test]
    fn regions_are_deduplicated() {
        let snapshot = snapshot_with(&[("Bergen", "New Jersey"), ("Bergen", "New Jersey")]);
        let catalog = build_catalog(&snapshot, &[]);
        assert_eq!(catalog.len(), 1);
    }
}

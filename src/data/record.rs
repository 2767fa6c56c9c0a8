//! Case records and region identity for the county feed.
//! One record per (date, county, state); regions key selection and grouping.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Names reported by the feed as independent cities rather than counties.
/// Affects display labels only, never identity.
pub const CITIES_WITHOUT_COUNTIES: &[&str] = &["New York City", "Kansas City"];

pub fn is_independent_city(name: &str) -> bool {
    CITIES_WITHOUT_COUNTIES.iter().any(|city| *city == name)
}

/// One row of the source feed. `cases` and `deaths` are cumulative; the feed
/// promises `deaths <= cases` but does not enforce it, and neither do we.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub date: NaiveDate,
    pub county: String,
    pub state: String,
    /// Fixed-width region code; empty when the feed omits it.
    pub fips: String,
    pub cases: u64,
    pub deaths: u64,
}

impl CaseRecord {
    pub fn region_key(&self) -> RegionKey {
        RegionKey {
            county: self.county.clone(),
            state: self.state.clone(),
        }
    }
}

/// Identity pair (county, state) used for selection, grouping, and as a
/// stable map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionKey {
    pub county: String,
    pub state: String,
}

impl RegionKey {
    pub fn new(county: impl Into<String>, state: impl Into<String>) -> Self {
        RegionKey {
            county: county.into(),
            state: state.into(),
        }
    }

    /// "Bergen County, New Jersey", or "New York City, New York" for names
    /// on the independent-city list.
    pub fn display_label(&self) -> String {
        if is_independent_city(&self.county) {
            format!("{}, {}", self.county, self.state)
        } else {
            format!("{} County, {}", self.county, self.state)
        }
    }
}

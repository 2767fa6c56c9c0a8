//! Runtime configuration: source URI, fetch timeout, refresh interval,
//! malformed-row tolerance, and the optional city-alias table path.
//! Compiled defaults, overridable from COUNTYWATCH_* environment variables.

use std::env;
use std::time::Duration;

/// County-level feed; one row per (date, county, state).
pub const DEFAULT_SOURCE: &str =
    "https://raw.githubusercontent.com/nytimes/covid-19-data/master/us-counties.csv";

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Daily, matching the feed's publication cadence.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 86_400;

/// Fraction of malformed rows tolerated before a load is rejected outright.
pub const DEFAULT_MALFORMED_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub source: String,
    pub fetch_timeout: Duration,
    pub refresh_interval: Duration,
    pub malformed_tolerance: f64,
    /// Path to the static city-alias JSON table; no aliases when unset.
    pub city_aliases_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            source: DEFAULT_SOURCE.to_string(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
            malformed_tolerance: DEFAULT_MALFORMED_TOLERANCE,
            city_aliases_path: None,
        }
    }
}

impl AppConfig {
    /// Defaults overridden by COUNTYWATCH_SOURCE, COUNTYWATCH_FETCH_TIMEOUT_SECS,
    /// COUNTYWATCH_REFRESH_INTERVAL_SECS, COUNTYWATCH_MALFORMED_TOLERANCE and
    /// COUNTYWATCH_CITY_ALIASES. Unparseable values keep the default.
    pub fn from_env() -> Self {
        let mut config = AppConfig::default();
        if let Ok(source) = env::var("COUNTYWATCH_SOURCE") {
            if !source.trim().is_empty() {
                config.source = source.trim().to_string();
            }
        }
        if let Some(secs) = env_u64("COUNTYWATCH_FETCH_TIMEOUT_SECS") {
            config.fetch_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_u64("COUNTYWATCH_REFRESH_INTERVAL_SECS") {
            config.refresh_interval = Duration::from_secs(secs);
        }
        if let Some(tolerance) = env_f64("COUNTYWATCH_MALFORMED_TOLERANCE") {
            if (0.0..=1.0).contains(&tolerance) {
                config.malformed_tolerance = tolerance;
            }
        }
        if let Ok(path) = env::var("COUNTYWATCH_CITY_ALIASES") {
            if !path.trim().is_empty() {
                config.city_aliases_path = Some(path.trim().to_string());
            }
        }
        config
    }
}

fn env_u64(name: &str) -> Option<u64> {
    env::var(name).ok()?.trim().parse().ok()
}

fn env_f64(name: &str) -> Option<f64> {
    env::var(name).ok()?.trim().parse().ok()
}

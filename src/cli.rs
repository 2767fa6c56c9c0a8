use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;

use chrono::NaiveDate;

use crate::config::AppConfig;
use crate::data::record::RegionKey;
use crate::data::store::DatasetStore;
use crate::query::{self, QueryError, TimeSeriesResult};
use crate::schedule::RefreshScheduler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Refresh,
    Catalog,
    Query,
    Watch,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("refresh") => Some(Command::Refresh),
        Some("catalog") => Some(Command::Catalog),
        Some("query") => Some(Command::Query),
        Some("watch") => Some(Command::Watch),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Refresh) => handle_refresh(),
        Some(Command::Catalog) => handle_catalog(args),
        Some(Command::Query) => handle_query(args),
        Some(Command::Watch) => handle_watch(),
        None => {
            eprintln!("usage: countywatch <refresh|catalog|query|watch>");
            2
        }
    }
}

fn handle_refresh() -> i32 {
    let store = DatasetStore::new(AppConfig::from_env());
    match store.refresh() {
        Ok(snapshot) => match serde_json::to_string_pretty(snapshot.report()) {
            Ok(payload) => {
                println!("{payload}");
                0
            }
            Err(err) => {
                eprintln!("failed to serialize load report: {err}");
                1
            }
        },
        Err(err) => {
            eprintln!("refresh failed: {err}");
            1
        }
    }
}

fn handle_catalog(args: &[String]) -> i32 {
    let as_table = args.iter().any(|arg| arg == "--table");
    let store = DatasetStore::new(AppConfig::from_env());
    if let Err(err) = store.refresh() {
        eprintln!("refresh failed: {err}");
        return 1;
    }
    let catalog = match store.region_catalog() {
        Ok(catalog) => catalog,
        Err(err) => {
            eprintln!("catalog failed: {err}");
            return 1;
        }
    };

    if as_table {
        println!("label\tcounty\tstate");
        for entry in &catalog.entries {
            println!("{}\t{}\t{}", entry.label, entry.key.county, entry.key.state);
        }
        0
    } else {
        match serde_json::to_string_pretty(&catalog) {
            Ok(payload) => {
                println!("{payload}");
                0
            }
            Err(err) => {
                eprintln!("failed to serialize catalog: {err}");
                1
            }
        }
    }
}

fn handle_query(args: &[String]) -> i32 {
    let as_table = args.iter().any(|arg| arg == "--table");
    let positional: Vec<&String> = args
        .iter()
        .skip(2)
        .filter(|arg| !arg.starts_with("--"))
        .collect();
    if positional.len() < 3 {
        eprintln!(
            "usage: countywatch query <county,state> [<county,state> ...] <start> <end> [--table]"
        );
        return 2;
    }

    let (key_args, date_args) = positional.split_at(positional.len() - 2);
    let mut keys = Vec::with_capacity(key_args.len());
    for raw in key_args {
        match parse_region_key(raw) {
            Some(key) => keys.push(key),
            None => {
                eprintln!("invalid region '{raw}': expected county,state");
                return 2;
            }
        }
    }
    let Some(start) = parse_date(date_args[0]) else {
        eprintln!("invalid start date '{}': expected YYYY-MM-DD", date_args[0]);
        return 2;
    };
    let Some(end) = parse_date(date_args[1]) else {
        eprintln!("invalid end date '{}': expected YYYY-MM-DD", date_args[1]);
        return 2;
    };

    let store = DatasetStore::new(AppConfig::from_env());
    if let Err(err) = store.refresh() {
        eprintln!("refresh failed: {err}");
        return 1;
    }

    let results = match query::query(&store, &keys, start, end) {
        Ok(results) => results,
        Err(err @ QueryError::InvalidRange { .. }) => {
            eprintln!("{err}");
            return 2;
        }
        Err(err) => {
            eprintln!("query failed: {err}");
            return 1;
        }
    };

    if as_table {
        print_series_table(&results);
        0
    } else {
        print_series_json(&results)
    }
}

fn handle_watch() -> i32 {
    let config = AppConfig::from_env();
    let interval = config.refresh_interval;
    let store = Arc::new(DatasetStore::new(config));

    match store.refresh() {
        Ok(snapshot) => println!(
            "refreshed: {} records as of {}",
            snapshot.records().len(),
            snapshot.refreshed_at().to_rfc3339()
        ),
        // tolerated: the scheduler retries on the next interval
        Err(err) => eprintln!("refresh failed: {err}"),
    }

    let _scheduler = RefreshScheduler::start(Arc::clone(&store), interval);
    println!(
        "watching {} every {}s",
        store.config().source,
        interval.as_secs()
    );
    // runs until killed
    loop {
        thread::park();
    }
}

fn parse_region_key(raw: &str) -> Option<RegionKey> {
    let (county, state) = raw.split_once(',')?;
    let county = county.trim();
    let state = state.trim();
    if county.is_empty() || state.is_empty() {
        return None;
    }
    Some(RegionKey::new(county, state))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

fn print_series_table(results: &std::collections::HashMap<RegionKey, TimeSeriesResult>) {
    let ordered: BTreeMap<&RegionKey, &TimeSeriesResult> = results.iter().collect();
    println!("region\tdate\tcases\tdeaths\tmortality_rate");
    for (key, series) in ordered {
        for point in &series.points {
            let rate = point
                .mortality_rate
                .map(|rate| format!("{rate:.4}"))
                .unwrap_or_default();
            println!(
                "{},{}\t{}\t{}\t{}\t{}",
                key.county, key.state, point.date, point.cases, point.deaths, rate
            );
        }
    }
}

fn print_series_json(results: &std::collections::HashMap<RegionKey, TimeSeriesResult>) -> i32 {
    let ordered: BTreeMap<&RegionKey, &TimeSeriesResult> = results.iter().collect();
    let mut payload = serde_json::Map::new();
    for (key, series) in ordered {
        let value = match serde_json::to_value(series) {
            Ok(value) => value,
            Err(err) => {
                eprintln!("failed to serialize series: {err}");
                return 1;
            }
        };
        payload.insert(format!("{},{}", key.county, key.state), value);
    }
    match serde_json::to_string_pretty(&serde_json::Value::Object(payload)) {
        Ok(text) => {
            println!("{text}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize results: {err}");
            1
        }
    }
}

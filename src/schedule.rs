//! Periodic refresh driver: a background thread invoking the store's
//! refresh on a fixed interval, keeping the fetch off the query path. The
//! store makes no scheduling assumptions; this is one possible trigger.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::data::store::DatasetStore;

const POLL_STEP: Duration = Duration::from_millis(200);

pub struct RefreshScheduler {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshScheduler {
    /// Spawn the refresh loop. The first refresh fires after one full
    /// interval; callers wanting data immediately refresh before starting.
    pub fn start(store: Arc<DatasetStore>, interval: Duration) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let handle = thread::spawn(move || run_loop(&store, interval, &thread_stop));
        RefreshScheduler {
            stop,
            handle: Some(handle),
        }
    }

    /// Signal the loop to exit and wait for the thread to finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_loop(store: &DatasetStore, interval: Duration, stop: &AtomicBool) {
    loop {
        if sleep_until_stop(interval, stop) {
            return;
        }
        match store.refresh() {
            Ok(snapshot) => println!(
                "refreshed: {} records as of {}",
                snapshot.records().len(),
                snapshot.refreshed_at().to_rfc3339()
            ),
            // stale data keeps serving; the next interval retries
            Err(err) => eprintln!("refresh failed: {err}"),
        }
    }
}

/// Sleep `total` in small steps so a stop request is honored promptly.
/// Returns true when stop was requested.
fn sleep_until_stop(total: Duration, stop: &AtomicBool) -> bool {
    let mut remaining = total;
    while !remaining.is_zero() {
        if stop.load(Ordering::Relaxed) {
            return true;
        }
        let step = remaining.min(POLL_STEP);
        thread::sleep(step);
        remaining -= step;
    }
    stop.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn stop_interrupts_a_long_interval() {
        let flag = AtomicBool::new(false);
        let started = Instant::now();
        flag.store(true, Ordering::Relaxed);
        assert!(sleep_until_stop(Duration::from_secs(60), &flag));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}

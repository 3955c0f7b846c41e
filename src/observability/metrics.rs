//! Atomic counters for reconciliation loops.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Thread-safe atomic counter.
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Thread-safe atomic gauge.
#[derive(Debug, Default)]
pub struct Gauge {
    value: AtomicI64,
}

impl Gauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dec(&self) {
        self.value.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Per-collection reconciliation metrics.
#[derive(Debug, Default)]
pub struct SyncMetrics {
    pub fetches_started: Counter,
    pub fetches_succeeded: Counter,
    pub fetches_failed: Counter,
    /// Fetches triggered by a refresh request instead of the timer.
    pub out_of_band_refreshes: Counter,
    /// Timer ticks that fired while a fetch was already in flight.
    pub ticks_dropped: Counter,
    /// Results older than the data already applied.
    pub stale_results_discarded: Counter,
    pub in_flight: Gauge,
}

impl SyncMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_fetch_start(&self, out_of_band: bool) {
        self.fetches_started.inc();
        self.in_flight.inc();
        if out_of_band {
            self.out_of_band_refreshes.inc();
        }
    }

    pub fn record_fetch_end(&self, success: bool) {
        self.in_flight.dec();
        if success {
            self.fetches_succeeded.inc();
        } else {
            self.fetches_failed.inc();
        }
    }

    /// In-flight fetch abandoned by teardown.
    pub fn record_fetch_abandoned(&self) {
        self.in_flight.dec();
    }

    pub fn summary(&self) -> SyncMetricsSummary {
        SyncMetricsSummary {
            fetches_started: self.fetches_started.get(),
            fetches_succeeded: self.fetches_succeeded.get(),
            fetches_failed: self.fetches_failed.get(),
            out_of_band_refreshes: self.out_of_band_refreshes.get(),
            ticks_dropped: self.ticks_dropped.get(),
            stale_results_discarded: self.stale_results_discarded.get(),
            in_flight: self.in_flight.get(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncMetricsSummary {
    pub fetches_started: u64,
    pub fetches_succeeded: u64,
    pub fetches_failed: u64,
    pub out_of_band_refreshes: u64,
    pub ticks_dropped: u64,
    pub stale_results_discarded: u64,
    pub in_flight: i64,
}

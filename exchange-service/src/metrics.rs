//! Process counters and latency tracking for the exchange service.
//!
//! Plain atomics plus a bounded sample window for percentiles - cheap enough
//! to sit on the order path. The `/metrics` endpoint renders `export()` as a
//! flat text exposition.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tracing::warn;

/// Order processing above this threshold logs a warning.
const SLOW_ORDER_NS: u64 = 1_000_000; // 1ms

pub struct ServiceMetrics {
    pub orders_processed: AtomicU64,
    pub trades_executed: AtomicU64,
    pub order_updates_seen: AtomicU64,
    pub orders_cancelled: AtomicU64,
    pub feeder_messages: AtomicU64,
    order_latency_ns: Mutex<LatencyTracker>,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self {
            orders_processed: AtomicU64::new(0),
            trades_executed: AtomicU64::new(0),
            order_updates_seen: AtomicU64::new(0),
            orders_cancelled: AtomicU64::new(0),
            feeder_messages: AtomicU64::new(0),
            order_latency_ns: Mutex::new(LatencyTracker::new(1000)),
        }
    }

    /// Record one processed order and its engine round-trip latency.
    pub fn record_order(&self, symbol: &str, latency_ns: u64) {
        self.orders_processed.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut tracker) = self.order_latency_ns.lock() {
            tracker.record(latency_ns);
        }
        if latency_ns > SLOW_ORDER_NS {
            warn!(symbol, latency_ns, "slow order processing");
        }
    }

    pub fn record_trade(&self) {
        self.trades_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_order_update(&self) {
        self.order_updates_seen.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cancel(&self) {
        self.orders_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_feeder_message(&self) {
        self.feeder_messages.fetch_add(1, Ordering::Relaxed);
    }

    /// Export all counters for text exposition.
    pub fn export(&self) -> BTreeMap<String, u64> {
        let mut m = BTreeMap::new();
        m.insert(
            "orders_processed".to_string(),
            self.orders_processed.load(Ordering::Relaxed),
        );
        m.insert(
            "trades_executed".to_string(),
            self.trades_executed.load(Ordering::Relaxed),
        );
        m.insert(
            "order_updates_seen".to_string(),
            self.order_updates_seen.load(Ordering::Relaxed),
        );
        m.insert(
            "orders_cancelled".to_string(),
            self.orders_cancelled.load(Ordering::Relaxed),
        );
        m.insert(
            "feeder_messages".to_string(),
            self.feeder_messages.load(Ordering::Relaxed),
        );
        if let Ok(tracker) = self.order_latency_ns.lock() {
            if let Some(avg) = tracker.average() {
                m.insert("order_latency_ns_avg".to_string(), avg);
            }
            if let Some(p50) = tracker.percentile(50) {
                m.insert("order_latency_ns_p50".to_string(), p50);
            }
            if let Some(p99) = tracker.percentile(99) {
                m.insert("order_latency_ns_p99".to_string(), p99);
            }
        }
        m
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks latency samples over a bounded window for percentile calculation.
pub struct LatencyTracker {
    samples: Vec<u64>,
    max_samples: usize,
}

impl LatencyTracker {
    pub fn new(max_samples: usize) -> Self {
        Self {
            samples: Vec::with_capacity(max_samples),
            max_samples,
        }
    }

    /// Record a sample, evicting the oldest once the window is full.
    pub fn record(&mut self, value: u64) {
        if self.samples.len() >= self.max_samples {
            self.samples.remove(0);
        }
        self.samples.push(value);
    }

    /// Get a percentile value (0-100).
    pub fn percentile(&self, p: usize) -> Option<u64> {
        if self.samples.is_empty() {
            return None;
        }

        let mut sorted = self.samples.clone();
        sorted.sort_unstable();

        let idx = (p as f64 / 100.0 * (sorted.len() - 1) as f64) as usize;
        Some(sorted[idx.min(sorted.len() - 1)])
    }

    pub fn average(&self) -> Option<u64> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: u64 = self.samples.iter().sum();
        Some(sum / self.samples.len() as u64)
    }

    pub fn count(&self) -> usize {
        self.samples.len()
    }
}

//! Request metrics for the observations resource.

use std::sync::atomic::{AtomicU64, Ordering};

use metrics::counter;
use serde::Serialize;

/// Counts decoded and rejected requests.
///
/// Every update is mirrored to the global `metrics` recorder, so the
/// Prometheus exporter sees the same numbers.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    pub get_by_id: AtomicU64,
    pub search: AtomicU64,
    pub insert: AtomicU64,
    pub delete: AtomicU64,
    pub options: AtomicU64,
    pub decode_failures: AtomicU64,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub get_by_id: u64,
    pub search: u64,
    pub insert: u64,
    pub delete: u64,
    pub options: u64,
    pub decode_failures: u64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successfully decoded request of the given kind.
    pub fn record_request(&self, kind: &'static str) {
        let slot = match kind {
            "get_by_id" => &self.get_by_id,
            "search" => &self.search,
            "insert" => &self.insert,
            "delete" => &self.delete,
            _ => &self.options,
        };
        slot.fetch_add(1, Ordering::Relaxed);
        counter!("sos_rest_requests_total", "kind" => kind).increment(1);
    }

    /// Record a request rejected while decoding, labelled by OWS exception code.
    pub fn record_failure(&self, code: &'static str) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
        counter!("sos_rest_decode_failures_total", "code" => code).increment(1);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            get_by_id: self.get_by_id.load(Ordering::Relaxed),
            search: self.search.load(Ordering::Relaxed),
            insert: self.insert.load(Ordering::Relaxed),
            delete: self.delete.load(Ordering::Relaxed),
            options: self.options.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
        }
    }
}

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for the ingest path, shared between the ingest task and
/// whoever reports on it.
#[derive(Debug, Default)]
pub struct IngestMetrics {
    connections_total: AtomicU64,
    connections_superseded: AtomicU64,
    records_ingested: AtomicU64,
    bytes_received: AtomicU64,
    records_dropped: AtomicU64,
    sync_gaps: AtomicU64,
    accept_errors: AtomicU64,
    read_errors: AtomicU64,
}

/// Point-in-time copy of [`IngestMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestMetricsSnapshot {
    pub connections_total: u64,
    pub connections_superseded: u64,
    pub records_ingested: u64,
    pub bytes_received: u64,
    pub records_dropped: u64,
    pub sync_gaps: u64,
    pub accept_errors: u64,
    pub read_errors: u64,
}

impl IngestMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_superseded(&self) {
        self.connections_superseded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ingested(&self, bytes: u64) {
        self.records_ingested.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Oversized line or incomplete trailing frame
    pub fn record_dropped(&self) {
        self.records_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn sync_gap(&self) {
        self.sync_gaps.fetch_add(1, Ordering::Relaxed);
    }

    pub fn accept_error(&self) {
        self.accept_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn read_error(&self) {
        self.read_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> IngestMetricsSnapshot {
        IngestMetricsSnapshot {
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_superseded: self.connections_superseded.load(Ordering::Relaxed),
            records_ingested: self.records_ingested.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            records_dropped: self.records_dropped.load(Ordering::Relaxed),
            sync_gaps: self.sync_gaps.load(Ordering::Relaxed),
            accept_errors: self.accept_errors.load(Ordering::Relaxed),
            read_errors: self.read_errors.load(Ordering::Relaxed),
        }
    }
}

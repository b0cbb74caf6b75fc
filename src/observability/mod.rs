pub mod metrics;
pub mod monitor;
pub mod sync_monitor;

pub use metrics::{IngestMetrics, IngestMetricsSnapshot};
pub use monitor::{ingest_report, sync_report, sync_summary};
pub use sync_monitor::{
    analyze_counters, counter_delta, SyncGap, SyncMonitor, SyncReport, DEFAULT_GAP_REPORT_LIMIT,
};

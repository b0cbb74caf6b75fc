use super::{IngestMetricsSnapshot, SyncReport};

fn plural(count: u64, noun: &str) -> String {
    format!("{} {}{}", count, noun, if count == 1 { "" } else { "s" })
}

/// One-line continuity verdict for a sync report
pub fn sync_summary(report: &SyncReport) -> String {
    if report.is_clean() {
        format!(
            "[SYNC CHECK] perfect sync ({} in {})",
            plural(0, "drop"),
            plural(report.frames, "packet")
        )
    } else {
        format!(
            "[SYNC CHECK] ALERT: {} detected in {}",
            plural(report.gaps, "sync jump"),
            plural(report.frames, "packet")
        )
    }
}

/// Multi-line report listing where the gaps are
pub fn sync_report(report: &SyncReport) -> String {
    let mut out = sync_summary(report);
    out.push('\n');

    for gap in &report.gap_positions {
        out.push_str(&format!(
            "  frame {}: expected counter {}, got {}\n",
            gap.frame_index, gap.expected, gap.observed
        ));
    }
    if report.positions_elided > 0 {
        out.push_str(&format!("  ... {} more not listed\n", report.positions_elided));
    }

    out
}

/// Human-readable ingest counters
pub fn ingest_report(snapshot: &IngestMetricsSnapshot) -> String {
    let mut report = String::from("=== Ingest Metrics ===\n");
    report.push_str(&format!(
        "  Connections: {} ({} superseded)\n",
        snapshot.connections_total, snapshot.connections_superseded
    ));
    report.push_str(&format!(
        "  Records: {} ingested, {} dropped, {} received\n",
        snapshot.records_ingested,
        snapshot.records_dropped,
        plural(snapshot.bytes_received, "byte")
    ));
    report.push_str(&format!("  Sync: {}\n", plural(snapshot.sync_gaps, "gap")));
    report.push_str(&format!(
        "  Errors: {} accept, {} read\n",
        snapshot.accept_errors, snapshot.read_errors
    ));
    report
}

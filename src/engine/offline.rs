use serde::Serialize;

use crate::codec::{self, LoadOutcome};
use crate::core::{DecodedRecord, EventMarker, PacketGeometry};
use crate::error::CodecError;
use crate::observability::{analyze_counters, SyncReport};

/// Options for a batch pass over a capture
#[derive(Debug, Clone, Copy)]
pub struct AnalysisOptions {
    pub geometry: PacketGeometry,
    pub extract_events: bool,
    pub gap_report_limit: usize,
}

/// Everything recovered from one capture
#[derive(Debug, Clone, Serialize)]
pub struct CaptureAnalysis {
    pub geometry: PacketGeometry,
    pub discarded_bytes: usize,
    pub sync: SyncReport,
    pub records: Vec<DecodedRecord>,
    pub events: Vec<EventMarker>,
}

impl CaptureAnalysis {
    pub fn frame_count(&self) -> usize {
        self.records.len()
    }

    /// All samples of `channel`, in frame order
    pub fn channel(&self, channel: usize) -> Option<Vec<i32>> {
        if channel >= self.geometry.channel_count {
            return None;
        }
        Some(self.records.iter().map(|r| r.samples[channel]).collect())
    }
}

#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    /// Capture shorter than one packet
    Empty { discarded_bytes: usize },
    Analyzed(CaptureAnalysis),
}

/// Align, sync-check and decode a captured buffer.
///
/// The sync check is advisory; gaps are reported, decoding always covers
/// every complete frame. Fails only for an invalid geometry.
pub fn analyze_capture(
    bytes: &[u8],
    options: AnalysisOptions,
) -> Result<AnalysisOutcome, CodecError> {
    options.geometry.validate()?;

    let frames = match codec::align(bytes, options.geometry) {
        LoadOutcome::Empty { discarded_bytes } => {
            tracing::info!(discarded_bytes, "capture holds no complete packet");
            return Ok(AnalysisOutcome::Empty { discarded_bytes });
        }
        LoadOutcome::Aligned(frames) => frames,
    };

    tracing::info!(frames = frames.len(), "reading packets");

    let sync = analyze_counters(&frames.counters(), options.gap_report_limit);
    if sync.is_clean() {
        tracing::info!(frames = sync.frames, "sync check clean");
    } else {
        tracing::warn!(gaps = sync.gaps, frames = sync.frames, "sync check found gaps");
    }

    let records: Vec<DecodedRecord> = frames
        .iter()
        .map(|frame| codec::decode(&frame, options.extract_events))
        .collect();
    let events = records.iter().flat_map(|r| r.events.iter().copied()).collect();

    Ok(AnalysisOutcome::Analyzed(CaptureAnalysis {
        geometry: options.geometry,
        discarded_bytes: frames.discarded_bytes(),
        sync,
        records,
        events,
    }))
}

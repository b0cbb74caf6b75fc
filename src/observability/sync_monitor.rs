use serde::{Deserialize, Serialize};

/// Default number of gap positions kept in a report
pub const DEFAULT_GAP_REPORT_LIMIT: usize = 100;

/// Counter delta between consecutive frames, modulo 256
#[inline]
pub fn counter_delta(previous: u8, current: u8) -> u8 {
    current.wrapping_sub(previous)
}

/// One counter discontinuity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncGap {
    /// Index of the first frame after the discontinuity
    pub frame_index: u64,
    pub expected: u8,
    pub observed: u8,
}

/// Aggregate continuity statistics.
///
/// `gaps` counts discontinuities, not lost frames: a jump of +5 and a
/// jump backwards are one gap each.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub frames: u64,
    pub gaps: u64,
    /// First gaps in stream order, at most the report limit
    pub gap_positions: Vec<SyncGap>,
    /// Gaps counted but not listed in `gap_positions`
    pub positions_elided: u64,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.gaps == 0
    }
}

/// Incremental continuity check over frame counters
#[derive(Debug, Clone)]
pub struct SyncMonitor {
    previous: Option<u8>,
    report: SyncReport,
    gap_report_limit: usize,
}

impl SyncMonitor {
    pub fn new() -> Self {
        Self::with_gap_report_limit(DEFAULT_GAP_REPORT_LIMIT)
    }

    pub fn with_gap_report_limit(gap_report_limit: usize) -> Self {
        Self {
            previous: None,
            report: SyncReport::default(),
            gap_report_limit,
        }
    }

    /// Feed the next counter. Returns the gap it closes, if any.
    pub fn observe(&mut self, counter: u8) -> Option<SyncGap> {
        let frame_index = self.report.frames;
        self.report.frames += 1;

        let previous = self.previous.replace(counter)?;
        if counter_delta(previous, counter) == 1 {
            return None;
        }

        let gap = SyncGap {
            frame_index,
            expected: previous.wrapping_add(1),
            observed: counter,
        };
        self.report.gaps += 1;
        if self.report.gap_positions.len() < self.gap_report_limit {
            self.report.gap_positions.push(gap);
        } else {
            self.report.positions_elided += 1;
        }
        Some(gap)
    }

    pub fn report(&self) -> &SyncReport {
        &self.report
    }

    pub fn into_report(self) -> SyncReport {
        self.report
    }

    /// Forget history; the next counter starts a fresh stream
    pub fn reset(&mut self) {
        self.previous = None;
        self.report = SyncReport::default();
    }
}

impl Default for SyncMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// Batch check over an already-captured counter column
pub fn analyze_counters(counters: &[u8], gap_report_limit: usize) -> SyncReport {
    let mut monitor = SyncMonitor::with_gap_report_limit(gap_report_limit);
    for &counter in counters {
        monitor.observe(counter);
    }
    monitor.into_report()
}

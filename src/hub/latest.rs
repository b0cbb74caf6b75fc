use std::sync::{Arc, Mutex};

use crate::core::HubRecord;

/// Text served before the first update
pub const NO_DATA_PLACEHOLDER: &str = "No data received yet.";

/// What a reader sees
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrentValue {
    /// No update has ever been stored
    Empty,

    /// Latest update. `sequence` counts updates since the hub was created
    /// and only ever grows.
    Populated {
        sequence: u64,
        record: Arc<HubRecord>,
    },
}

impl CurrentValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CurrentValue::Empty)
    }

    pub fn sequence(&self) -> u64 {
        match self {
            CurrentValue::Empty => 0,
            CurrentValue::Populated { sequence, .. } => *sequence,
        }
    }

    pub fn record(&self) -> Option<&HubRecord> {
        match self {
            CurrentValue::Empty => None,
            CurrentValue::Populated { record, .. } => Some(record),
        }
    }
}

#[derive(Default)]
struct Slot {
    sequence: u64,
    record: Option<Arc<HubRecord>>,
}

/// Holds the single most recent record.
///
/// One writer (the ingest task) replaces the value; any number of readers
/// copy it out. The lock is held only to swap or clone an `Arc`, never
/// across I/O, so readers and the writer wait on each other for at most
/// one pointer swap.
pub struct LiveHub {
    slot: Mutex<Slot>,
    placeholder: String,
}

impl LiveHub {
    pub fn new() -> Self {
        Self::with_placeholder(NO_DATA_PLACEHOLDER)
    }

    pub fn with_placeholder(placeholder: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Slot::default()),
            placeholder: placeholder.into(),
        }
    }

    /// Replace the current value. Last write wins. Returns the new sequence.
    pub fn update(&self, record: HubRecord) -> u64 {
        let record = Arc::new(record);
        let (sequence, previous) = {
            let mut slot = self
                .slot
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            slot.sequence += 1;
            (slot.sequence, slot.record.replace(record))
        };
        // Old record is freed outside the lock
        drop(previous);
        sequence
    }

    /// Copy out the current value
    pub fn snapshot(&self) -> CurrentValue {
        let slot = self
            .slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match &slot.record {
            None => CurrentValue::Empty,
            Some(record) => CurrentValue::Populated {
                sequence: slot.sequence,
                record: Arc::clone(record),
            },
        }
    }

    /// Current value as text, or the placeholder while empty
    pub fn snapshot_text(&self) -> String {
        match self.snapshot() {
            CurrentValue::Empty => self.placeholder.clone(),
            CurrentValue::Populated { record, .. } => record.to_text(),
        }
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }
}

impl Default for LiveHub {
    fn default() -> Self {
        Self::new()
    }
}

use serde::{Deserialize, Serialize};

use crate::core::{HubRecord, PacketGeometry};
use crate::observability::SyncGap;

/// How bytes on an ingest connection are cut into records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Framing {
    /// Newline-delimited, stored verbatim
    Lines,

    /// Fixed-size binary packets, decoded before storing
    Frames {
        geometry: PacketGeometry,
        #[serde(default)]
        extract_events: bool,
    },
}

impl Default for Framing {
    fn default() -> Self {
        Framing::Lines
    }
}

/// Result of one read from a [`RecordSource`](super::RecordSource)
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    /// A complete record. `gap` is set when the frame counter jumped.
    Record {
        record: HubRecord,
        bytes: usize,
        gap: Option<SyncGap>,
    },

    /// Bytes consumed without producing a record (oversized line or a
    /// frame cut short by disconnect)
    Dropped { bytes: usize },

    /// Peer closed the stream
    Eof,
}

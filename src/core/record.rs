use serde::{Deserialize, Serialize};

/// In-band annotation: a triplet of the form `(code, 0, 0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMarker {
    pub frame_index: u64,
    pub channel: usize,
    pub code: u8,
}

/// Decode result for one frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedRecord {
    /// Position of the frame in its stream
    pub frame_index: u64,

    /// Hardware sequence counter
    pub counter: u8,

    /// One signed 24-bit sample per channel, in channel order
    pub samples: Vec<i32>,

    /// Empty unless event extraction was requested
    pub events: Vec<EventMarker>,
}

impl DecodedRecord {
    pub fn channel_count(&self) -> usize {
        self.samples.len()
    }

    /// Samples as a comma-separated line, the same shape producers send as text
    pub fn to_csv(&self) -> String {
        let mut line = String::with_capacity(self.samples.len() * 9);
        for (i, sample) in self.samples.iter().enumerate() {
            if i > 0 {
                line.push(',');
            }
            line.push_str(&sample.to_string());
        }
        line
    }
}

/// What the live hub stores: an opaque text line or a decoded frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum HubRecord {
    Line(String),
    Decoded(DecodedRecord),
}

impl HubRecord {
    /// Text served to pollers
    pub fn to_text(&self) -> String {
        match self {
            HubRecord::Line(line) => line.clone(),
            HubRecord::Decoded(record) => record.to_csv(),
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::error::CodecError;

/// Bytes per channel triplet
pub const BYTES_PER_SAMPLE: usize = 3;

/// Layout of one packet: counter + reserved header bytes, then one
/// big-endian 24-bit triplet per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketGeometry {
    pub header_bytes: usize,
    pub channel_count: usize,
}

impl PacketGeometry {
    /// 8 channels, 27-byte packets
    pub const EIGHT_CHANNEL: PacketGeometry = PacketGeometry {
        header_bytes: 3,
        channel_count: 8,
    };

    /// 32 channels, 99-byte packets
    pub const THIRTY_TWO_CHANNEL: PacketGeometry = PacketGeometry {
        header_bytes: 3,
        channel_count: 32,
    };

    /// Create a geometry. Needs at least the counter byte and one channel.
    pub fn new(header_bytes: usize, channel_count: usize) -> Result<Self, CodecError> {
        let geometry = Self {
            header_bytes,
            channel_count,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    /// Check a geometry that may have come from deserialization
    pub fn validate(&self) -> Result<(), CodecError> {
        if self.header_bytes == 0 || self.channel_count == 0 {
            return Err(CodecError::InvalidGeometry {
                header_bytes: self.header_bytes,
                channel_count: self.channel_count,
            });
        }
        Ok(())
    }

    pub fn packet_size(&self) -> usize {
        self.header_bytes + BYTES_PER_SAMPLE * self.channel_count
    }

    /// Offset of the triplet for `channel`
    pub fn channel_offset(&self, channel: usize) -> usize {
        self.header_bytes + BYTES_PER_SAMPLE * channel
    }
}

impl Default for PacketGeometry {
    fn default() -> Self {
        Self::THIRTY_TWO_CHANNEL
    }
}

/// One length-checked packet borrowed from a larger buffer.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    geometry: PacketGeometry,
    index: u64,
    bytes: &'a [u8],
}

impl<'a> Frame<'a> {
    /// Wrap `bytes` as frame number `index` of a stream.
    ///
    /// Fails unless `bytes.len()` is exactly the packet size.
    pub fn new(geometry: PacketGeometry, index: u64, bytes: &'a [u8]) -> Result<Self, CodecError> {
        let expected = geometry.packet_size();
        if bytes.len() != expected {
            return Err(CodecError::FrameLength {
                expected,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            geometry,
            index,
            bytes,
        })
    }

    pub fn geometry(&self) -> PacketGeometry {
        self.geometry
    }

    /// Position of this frame in its stream
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Hardware sequence counter (byte 0)
    pub fn counter(&self) -> u8 {
        self.bytes[0]
    }

    /// Reserved header bytes after the counter
    pub fn reserved(&self) -> &'a [u8] {
        &self.bytes[1..self.geometry.header_bytes]
    }

    /// Raw triplet for `channel`
    pub fn triplet(&self, channel: usize) -> [u8; 3] {
        let offset = self.geometry.channel_offset(channel);
        [
            self.bytes[offset],
            self.bytes[offset + 1],
            self.bytes[offset + 2],
        ]
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

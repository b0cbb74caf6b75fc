use crate::core::{Frame, PacketGeometry};

/// Result of aligning a buffer to whole packets.
///
/// `Empty` is an ordinary outcome, not an error: the buffer did not hold
/// a single complete packet.
#[derive(Debug, Clone, Copy)]
pub enum LoadOutcome<'a> {
    Empty { discarded_bytes: usize },
    Aligned(AlignedFrames<'a>),
}

impl<'a> LoadOutcome<'a> {
    pub fn discarded_bytes(&self) -> usize {
        match self {
            LoadOutcome::Empty { discarded_bytes } => *discarded_bytes,
            LoadOutcome::Aligned(frames) => frames.discarded_bytes(),
        }
    }

    pub fn frame_count(&self) -> usize {
        match self {
            LoadOutcome::Empty { .. } => 0,
            LoadOutcome::Aligned(frames) => frames.len(),
        }
    }
}

/// A buffer cut to a whole number of packets
#[derive(Debug, Clone, Copy)]
pub struct AlignedFrames<'a> {
    geometry: PacketGeometry,
    bytes: &'a [u8],
    discarded_bytes: usize,
}

impl<'a> AlignedFrames<'a> {
    pub fn geometry(&self) -> PacketGeometry {
        self.geometry
    }

    /// Number of complete frames (never zero)
    pub fn len(&self) -> usize {
        self.bytes.len() / self.geometry.packet_size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Trailing bytes that did not form a complete packet
    pub fn discarded_bytes(&self) -> usize {
        self.discarded_bytes
    }

    /// Frame `index`, if in range
    pub fn get(&self, index: usize) -> Option<Frame<'a>> {
        let size = self.geometry.packet_size();
        let start = index.checked_mul(size)?;
        let chunk = self.bytes.get(start..start + size)?;
        Frame::new(self.geometry, index as u64, chunk).ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = Frame<'a>> + 'a {
        let geometry = self.geometry;
        self.bytes
            .chunks_exact(geometry.packet_size())
            .enumerate()
            .filter_map(move |(i, chunk)| Frame::new(geometry, i as u64, chunk).ok())
    }

    /// Byte 0 of every frame, in order
    pub fn counters(&self) -> Vec<u8> {
        self.bytes
            .chunks_exact(self.geometry.packet_size())
            .map(|chunk| chunk[0])
            .collect()
    }
}

/// Cut `bytes` into whole packets, dropping any incomplete trailing packet.
pub fn align(bytes: &[u8], geometry: PacketGeometry) -> LoadOutcome<'_> {
    let size = geometry.packet_size();
    if size == 0 {
        return LoadOutcome::Empty {
            discarded_bytes: bytes.len(),
        };
    }
    let frame_count = bytes.len() / size;
    let usable = frame_count * size;
    let discarded_bytes = bytes.len() - usable;

    if discarded_bytes > 0 {
        tracing::warn!(
            discarded_bytes,
            packet_size = size,
            "discarding incomplete trailing packet"
        );
    }

    if frame_count == 0 {
        return LoadOutcome::Empty { discarded_bytes };
    }

    tracing::debug!(frame_count, packet_size = size, "aligned capture buffer");

    LoadOutcome::Aligned(AlignedFrames {
        geometry,
        bytes: &bytes[..usable],
        discarded_bytes,
    })
}

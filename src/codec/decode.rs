use crate::core::{DecodedRecord, EventMarker, Frame, PacketGeometry};
use crate::error::CodecError;

/// Smallest value a 24-bit two's-complement sample can hold
pub const SAMPLE_MIN: i32 = -0x80_0000;

/// Largest value a 24-bit two's-complement sample can hold
pub const SAMPLE_MAX: i32 = 0x7F_FFFF;

const SIGN_BIT: u32 = 0x80_0000;
const MODULUS: i64 = 0x100_0000;

/// Reconstruct a signed sample from a big-endian triplet
#[inline]
pub fn decode_sample(triplet: [u8; 3]) -> i32 {
    let raw = (u32::from(triplet[0]) << 16) | (u32::from(triplet[1]) << 8) | u32::from(triplet[2]);
    if raw >= SIGN_BIT {
        (i64::from(raw) - MODULUS) as i32
    } else {
        raw as i32
    }
}

/// Inverse of [`decode_sample`]
pub fn encode_sample(value: i32) -> Result<[u8; 3], CodecError> {
    if !(SAMPLE_MIN..=SAMPLE_MAX).contains(&value) {
        return Err(CodecError::SampleOutOfRange(value));
    }
    let raw = (value as u32) & 0xFF_FFFF;
    Ok([(raw >> 16) as u8, (raw >> 8) as u8, raw as u8])
}

/// `(code, 0, 0)` with a nonzero code marks an event
#[inline]
fn event_code(triplet: [u8; 3]) -> Option<u8> {
    match triplet {
        [code, 0, 0] if code != 0 => Some(code),
        _ => None,
    }
}

/// Decode one frame into per-channel samples.
///
/// With `extract_events`, event triplets also produce an [`EventMarker`];
/// the sample for that channel is still decoded normally.
pub fn decode(frame: &Frame<'_>, extract_events: bool) -> DecodedRecord {
    let channel_count = frame.geometry().channel_count;
    let mut samples = Vec::with_capacity(channel_count);
    let mut events = Vec::new();

    for channel in 0..channel_count {
        let triplet = frame.triplet(channel);

        if extract_events {
            if let Some(code) = event_code(triplet) {
                events.push(EventMarker {
                    frame_index: frame.index(),
                    channel,
                    code,
                });
            }
        }

        samples.push(decode_sample(triplet));
    }

    DecodedRecord {
        frame_index: frame.index(),
        counter: frame.counter(),
        samples,
        events,
    }
}

/// Build one packet. Reserved header bytes are left zero.
pub fn encode_frame(
    geometry: PacketGeometry,
    counter: u8,
    samples: &[i32],
) -> Result<Vec<u8>, CodecError> {
    if samples.len() != geometry.channel_count {
        return Err(CodecError::ChannelCount {
            expected: geometry.channel_count,
            actual: samples.len(),
        });
    }

    let mut packet = vec![0u8; geometry.packet_size()];
    packet[0] = counter;
    for (channel, &sample) in samples.iter().enumerate() {
        let offset = geometry.channel_offset(channel);
        packet[offset..offset + 3].copy_from_slice(&encode_sample(sample)?);
    }
    Ok(packet)
}

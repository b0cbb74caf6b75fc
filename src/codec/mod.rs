//! Packet protocol: alignment of raw buffers into frames and the
//! 24-bit sample decode.

pub mod decode;
pub mod loader;

pub use decode::{decode, decode_sample, encode_frame, encode_sample, SAMPLE_MAX, SAMPLE_MIN};
pub use loader::{align, AlignedFrames, LoadOutcome};

use std::io;

/// Errors raised while framing or encoding packets.
///
/// Decoding a well-formed [`Frame`](crate::core::Frame) never fails; the
/// length check happens when the frame is constructed.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Buffer handed to `Frame::new` is not exactly one packet long
    #[error("frame length {actual} does not match packet size {expected}")]
    FrameLength { expected: usize, actual: usize },

    /// Geometry without a counter byte or without channels
    #[error("invalid packet geometry: {header_bytes} header bytes, {channel_count} channels")]
    InvalidGeometry {
        header_bytes: usize,
        channel_count: usize,
    },

    /// Sample does not fit in 24-bit two's complement
    #[error("sample {0} outside the 24-bit signed range")]
    SampleOutOfRange(i32),

    /// Wrong number of samples for the geometry
    #[error("expected {expected} samples, got {actual}")]
    ChannelCount { expected: usize, actual: usize },
}

/// Errors from the ingest transport.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Listener could not be bound; fatal for that listener
    #[error("failed to bind ingest listener to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Errors while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Geometry(#[from] CodecError),
}

/// Connection resets are routine when a producer goes away.
pub fn is_connection_reset(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof
    )
}

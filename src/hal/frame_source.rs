use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::traits::RecordSource;
use super::types::ReadOutcome;
use crate::codec;
use crate::core::{Frame, HubRecord, PacketGeometry};
use crate::error::IngestError;
use crate::observability::SyncMonitor;

/// Fixed-size binary packets, decoded as they arrive.
///
/// Counters are checked inline; a jump is attached to the record as a
/// gap but never stops decoding.
pub struct FrameSource<R> {
    reader: R,
    geometry: PacketGeometry,
    extract_events: bool,
    buf: Vec<u8>,
    filled: usize,
    next_index: u64,
    monitor: SyncMonitor,
}

impl<R> FrameSource<R>
where
    R: AsyncRead + Unpin + Send,
{
    pub fn new(reader: R, geometry: PacketGeometry, extract_events: bool) -> Self {
        Self {
            reader,
            geometry,
            extract_events,
            buf: vec![0u8; geometry.packet_size()],
            filled: 0,
            next_index: 0,
            monitor: SyncMonitor::new(),
        }
    }

    /// Continuity statistics for this connection so far
    pub fn monitor(&self) -> &SyncMonitor {
        &self.monitor
    }
}

#[async_trait]
impl<R> RecordSource for FrameSource<R>
where
    R: AsyncRead + Unpin + Send,
{
    fn kind(&self) -> &'static str {
        "frames"
    }

    async fn read_record(&mut self) -> Result<ReadOutcome, IngestError> {
        while self.filled < self.buf.len() {
            let n = self.reader.read(&mut self.buf[self.filled..]).await?;
            if n == 0 {
                if self.filled == 0 {
                    return Ok(ReadOutcome::Eof);
                }
                let bytes = std::mem::take(&mut self.filled);
                tracing::debug!(bytes, "stream ended inside a packet");
                return Ok(ReadOutcome::Dropped { bytes });
            }
            self.filled += n;
        }

        let bytes = std::mem::take(&mut self.filled);
        let frame = Frame::new(self.geometry, self.next_index, &self.buf)?;
        self.next_index += 1;

        let gap = self.monitor.observe(frame.counter());
        let record = codec::decode(&frame, self.extract_events);

        Ok(ReadOutcome::Record {
            record: HubRecord::Decoded(record),
            bytes,
            gap,
        })
    }
}

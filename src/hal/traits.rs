use async_trait::async_trait;

use super::types::ReadOutcome;
use crate::error::IngestError;

/// Reads one delimited record at a time from a byte transport.
///
/// Implementations keep partial input in `self`, so a `read_record` future
/// that is dropped mid-way loses nothing already consumed.
#[async_trait]
pub trait RecordSource: Send {
    /// Short label for logs (e.g. "lines", "frames")
    fn kind(&self) -> &'static str;

    /// Wait for the next record or end of stream
    async fn read_record(&mut self) -> Result<ReadOutcome, IngestError>;
}

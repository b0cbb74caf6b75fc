use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use super::traits::RecordSource;
use super::types::ReadOutcome;
use crate::core::HubRecord;
use crate::error::IngestError;

/// Default cap on a single line (1 MiB)
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;

/// Newline-delimited text records.
///
/// Lines whose content (terminator excluded) is longer than
/// `max_line_bytes` are consumed up to their newline and reported as
/// dropped. Blank lines carry no reading and are skipped rather than
/// replacing the stored value.
pub struct LineSource<R> {
    reader: R,
    max_line_bytes: usize,
    line: Vec<u8>,
    consumed: usize,
    overflowed: bool,
}

impl<R> LineSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(reader: R, max_line_bytes: usize) -> Self {
        Self {
            reader,
            max_line_bytes,
            line: Vec::new(),
            consumed: 0,
            overflowed: false,
        }
    }

    /// `None` for a blank line
    fn finish_line(&mut self) -> Option<ReadOutcome> {
        let bytes = std::mem::take(&mut self.consumed);
        if std::mem::take(&mut self.overflowed) {
            self.line.clear();
            return Some(ReadOutcome::Dropped { bytes });
        }

        let mut end = self.line.len();
        if end > 0 && self.line[end - 1] == b'\n' {
            end -= 1;
        }
        if end > 0 && self.line[end - 1] == b'\r' {
            end -= 1;
        }

        let outcome = if end > self.max_line_bytes {
            Some(ReadOutcome::Dropped { bytes })
        } else if end == 0 {
            None
        } else {
            let text = String::from_utf8_lossy(&self.line[..end]).into_owned();
            Some(ReadOutcome::Record {
                record: HubRecord::Line(text),
                bytes,
                gap: None,
            })
        };
        self.line.clear();
        outcome
    }

    async fn read_line(&mut self) -> Result<Option<ReadOutcome>, IngestError> {
        loop {
            let available = self.reader.fill_buf().await?;

            if available.is_empty() {
                if self.consumed == 0 {
                    return Ok(Some(ReadOutcome::Eof));
                }
                // Unterminated last line
                return Ok(self.finish_line());
            }

            let (take, done) = match available.iter().position(|&b| b == b'\n') {
                Some(pos) => (pos + 1, true),
                None => (available.len(), false),
            };

            if !self.overflowed {
                // Room for a trailing "\r\n"; content length is checked in finish_line
                if self.line.len() + take <= self.max_line_bytes.saturating_add(2) {
                    self.line.extend_from_slice(&available[..take]);
                } else {
                    self.overflowed = true;
                    self.line.clear();
                }
            }

            self.consumed += take;
            self.reader.consume(take);

            if done {
                return Ok(self.finish_line());
            }
        }
    }
}

#[async_trait]
impl<R> RecordSource for LineSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    fn kind(&self) -> &'static str {
        "lines"
    }

    async fn read_record(&mut self) -> Result<ReadOutcome, IngestError> {
        loop {
            if let Some(outcome) = self.read_line().await? {
                return Ok(outcome);
            }
        }
    }
}

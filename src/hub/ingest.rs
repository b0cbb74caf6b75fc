//! Ingest listener for the live hub.
//!
//! One producer connection feeds the hub at a time. The listener keeps
//! accepting while a connection is active and a newly accepted connection
//! replaces the current one. When the producer disconnects the listener
//! goes back to accepting; accept and read failures back off per the
//! configured [`RetryPolicy`] instead of ending the task. An accept failure
//! while a producer is connected pauses only the listener; the connection
//! is still read during the pause.
//!
//! ```text
//! Accepting --accept--> Connected --EOF--> Accepting
//!     |                  |    ^
//!     |             error|    |accept (supersede)
//!     v                  v    |
//!   Backoff <------------+    +
//!     |
//!     +--delay--> Accepting
//! ```

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use super::LiveHub;
use crate::config::HubConfig;
use crate::engine::IngestState;
use crate::error::{is_connection_reset, IngestError};
use crate::hal::{FrameSource, Framing, LineSource, ReadOutcome, RecordSource};
use crate::observability::IngestMetrics;
use crate::resilience::RetryPolicy;

/// The producer currently feeding the hub
struct Connection {
    peer: SocketAddr,
    source: Box<dyn RecordSource>,
}

/// What woke the loop up
enum Step {
    Shutdown,
    Accepted(TcpStream, SocketAddr),
    AcceptFailed(io::Error),
    AcceptResumed,
    Read(Result<ReadOutcome, IngestError>),
}

impl Step {
    fn from_accept(result: io::Result<(TcpStream, SocketAddr)>) -> Self {
        match result {
            Ok((stream, peer)) => Step::Accepted(stream, peer),
            Err(e) => Step::AcceptFailed(e),
        }
    }
}

/// Accept errors while a producer is connected rest the listener instead
/// of the whole loop, so the live connection keeps being read.
#[derive(Debug, Default)]
struct AcceptPause {
    until: Option<Instant>,
    attempt: u32,
}

impl AcceptPause {
    fn is_paused(&self) -> bool {
        self.until.is_some()
    }

    fn deadline(&self) -> Instant {
        self.until.unwrap_or_else(Instant::now)
    }

    /// Record one more failure and pause per `policy`. Returns the delay.
    fn pause(&mut self, policy: &RetryPolicy, now: Instant) -> Duration {
        self.attempt = self.attempt.saturating_add(1);
        let delay = policy.delay(self.attempt);
        self.until = Some(now + delay);
        delay
    }

    /// Poll the listener again; the failure count is kept until an accept succeeds
    fn resume(&mut self) {
        self.until = None;
    }

    fn clear(&mut self) {
        self.until = None;
        self.attempt = 0;
    }
}

/// Accepts producer connections and writes their records into a [`LiveHub`].
pub struct IngestServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    framing: Framing,
    retry: RetryPolicy,
    max_line_bytes: usize,
    read_buffer_bytes: usize,
    hub: Arc<LiveHub>,
    metrics: Arc<IngestMetrics>,
    state_tx: watch::Sender<IngestState>,
}

impl IngestServer {
    /// Bind the listener. Failure here is fatal for this listener.
    pub async fn bind(
        config: &HubConfig,
        hub: Arc<LiveHub>,
        metrics: Arc<IngestMetrics>,
    ) -> Result<Self, IngestError> {
        if let Framing::Frames { geometry, .. } = &config.framing {
            geometry.validate()?;
        }

        let bind_addr = config.bind_address();

        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| IngestError::Bind {
                address: bind_addr.clone(),
                source: e,
            })?;
        let local_addr = listener.local_addr()?;

        tracing::info!(
            address = %local_addr,
            framing = ?config.framing,
            "ingest listener bound"
        );

        let (state_tx, _) = watch::channel(IngestState::Accepting);

        Ok(Self {
            listener,
            local_addr,
            framing: config.framing,
            retry: config.retry,
            max_line_bytes: config.max_line_bytes,
            read_buffer_bytes: config.read_buffer_bytes,
            hub,
            metrics,
            state_tx,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Watch the accept-loop state
    pub fn state(&self) -> watch::Receiver<IngestState> {
        self.state_tx.subscribe()
    }

    fn transition(&self, next: IngestState) {
        let current = self.state_tx.borrow().clone();
        if !current.can_transition_to(&next) {
            tracing::warn!(from = current.name(), to = next.name(), "unexpected ingest transition");
        }
        tracing::debug!(from = current.name(), to = next.name(), "ingest state");
        self.state_tx.send_replace(next);
    }

    fn open(&self, stream: TcpStream, peer: SocketAddr) -> Connection {
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(error = %e, "failed to set TCP_NODELAY");
        }
        self.metrics.connection_opened();

        let source: Box<dyn RecordSource> = match self.framing {
            Framing::Lines => Box::new(LineSource::new(
                BufReader::with_capacity(self.read_buffer_bytes, stream),
                self.max_line_bytes,
            )),
            Framing::Frames {
                geometry,
                extract_events,
            } => Box::new(FrameSource::new(
                BufReader::with_capacity(self.read_buffer_bytes, stream),
                geometry,
                extract_events,
            )),
        };

        tracing::info!(peer = %peer, kind = source.kind(), "producer connected");
        self.transition(IngestState::Connected { peer });

        Connection { peer, source }
    }

    /// Sleep before retrying. Returns `false` if cancelled meanwhile.
    async fn back_off(&self, attempt: u32, cancel: &CancellationToken) -> bool {
        let delay = self.retry.delay(attempt);
        self.transition(IngestState::Backoff { attempt });
        tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "ingest backing off");

        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(delay) => {
                self.transition(IngestState::Accepting);
                true
            }
        }
    }

    /// Run until `cancel` fires. The listener is closed on return.
    pub async fn run(self, cancel: CancellationToken) {
        let mut active: Option<Connection> = None;
        let mut attempt = 0u32;
        let mut pause = AcceptPause::default();

        loop {
            let step = match active.as_mut() {
                None => tokio::select! {
                    _ = cancel.cancelled() => Step::Shutdown,
                    accepted = self.listener.accept(), if !pause.is_paused() => {
                        Step::from_accept(accepted)
                    }
                    _ = tokio::time::sleep_until(pause.deadline()), if pause.is_paused() => {
                        Step::AcceptResumed
                    }
                },
                Some(conn) => tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Step::Shutdown,
                    accepted = self.listener.accept(), if !pause.is_paused() => {
                        Step::from_accept(accepted)
                    }
                    _ = tokio::time::sleep_until(pause.deadline()), if pause.is_paused() => {
                        Step::AcceptResumed
                    }
                    outcome = conn.source.read_record() => Step::Read(outcome),
                },
            };

            match step {
                Step::Shutdown => break,

                Step::Accepted(stream, peer) => {
                    if let Some(previous) = active.take() {
                        tracing::info!(
                            previous = %previous.peer,
                            peer = %peer,
                            "newer producer supersedes current connection"
                        );
                        self.metrics.connection_superseded();
                    }
                    attempt = 0;
                    pause.clear();
                    active = Some(self.open(stream, peer));
                }

                Step::AcceptFailed(e) => {
                    self.metrics.accept_error();
                    if active.is_some() {
                        let delay = pause.pause(&self.retry, Instant::now());
                        tracing::warn!(
                            error = %e,
                            delay_ms = delay.as_millis() as u64,
                            "ingest accept error, pausing accepts"
                        );
                    } else {
                        tracing::warn!(error = %e, "ingest accept error");
                        attempt = attempt.saturating_add(1);
                        if !self.back_off(attempt, &cancel).await {
                            break;
                        }
                    }
                }

                Step::AcceptResumed => pause.resume(),

                Step::Read(Ok(ReadOutcome::Record { record, bytes, gap })) => {
                    if let Some(gap) = gap {
                        self.metrics.sync_gap();
                        tracing::debug!(
                            frame = gap.frame_index,
                            expected = gap.expected,
                            observed = gap.observed,
                            "frame counter jumped"
                        );
                    }
                    self.hub.update(record);
                    self.metrics.record_ingested(bytes as u64);
                }

                Step::Read(Ok(ReadOutcome::Dropped { bytes })) => {
                    self.metrics.record_dropped();
                    tracing::debug!(bytes, "dropped incomplete or oversized record");
                }

                Step::Read(Ok(ReadOutcome::Eof)) => {
                    if let Some(conn) = active.take() {
                        tracing::info!(peer = %conn.peer, "producer disconnected");
                    }
                    self.transition(IngestState::Accepting);
                }

                Step::Read(Err(e)) => {
                    self.metrics.read_error();
                    let peer = active.take().map(|conn| conn.peer);
                    match &e {
                        IngestError::Io(io_err) if is_connection_reset(io_err) => {
                            tracing::info!(peer = ?peer, "producer connection reset");
                        }
                        _ => tracing::warn!(peer = ?peer, error = %e, "ingest read error"),
                    }
                    attempt = attempt.saturating_add(1);
                    if !self.back_off(attempt, &cancel).await {
                        break;
                    }
                }
            }
        }

        drop(active);
        self.transition(IngestState::Stopped);
        tracing::info!(address = %self.local_addr, "ingest listener stopped");
    }
}

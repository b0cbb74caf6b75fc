use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::IngestState;
use crate::config::HubConfig;
use crate::hub::{IngestServer, LiveHub};
use crate::observability::IngestMetrics;

/// Runtime status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuntimeStatus {
    Stopped,
    Running,
    Error,
}

/// HubRuntime owns the live hub and the ingest task that feeds it
pub struct HubRuntime {
    config: HubConfig,

    /// Shared with every reader
    hub: Arc<LiveHub>,

    metrics: Arc<IngestMetrics>,

    status: RuntimeStatus,

    /// Cancels the ingest task
    cancel: Option<CancellationToken>,

    ingest_handle: Option<JoinHandle<()>>,

    local_addr: Option<SocketAddr>,

    ingest_state: Option<watch::Receiver<IngestState>>,
}

impl HubRuntime {
    pub fn new(config: HubConfig) -> Self {
        let hub = Arc::new(LiveHub::with_placeholder(config.placeholder.clone()));
        Self {
            config,
            hub,
            metrics: Arc::new(IngestMetrics::new()),
            status: RuntimeStatus::Stopped,
            cancel: None,
            ingest_handle: None,
            local_addr: None,
            ingest_state: None,
        }
    }

    /// Get current runtime status
    pub fn status(&self) -> RuntimeStatus {
        self.status
    }

    /// Reader handle; stays valid after shutdown
    pub fn hub(&self) -> Arc<LiveHub> {
        Arc::clone(&self.hub)
    }

    pub fn metrics(&self) -> Arc<IngestMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Address the ingest listener is bound to, once started
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Ingest accept-loop state, once started
    pub fn ingest_state(&self) -> Option<watch::Receiver<IngestState>> {
        self.ingest_state.clone()
    }

    /// Bind the ingest listener and spawn the ingest task
    pub async fn start(&mut self) -> Result<()> {
        if self.status == RuntimeStatus::Running {
            return Err(anyhow!("Hub runtime is already running"));
        }

        let server = match IngestServer::bind(&self.config, self.hub(), self.metrics()).await {
            Ok(server) => server,
            Err(e) => {
                self.status = RuntimeStatus::Error;
                return Err(e).context("Failed to start ingest listener");
            }
        };

        let cancel = CancellationToken::new();
        self.local_addr = Some(server.local_addr());
        self.ingest_state = Some(server.state());
        self.ingest_handle = Some(tokio::spawn(server.run(cancel.clone())));
        self.cancel = Some(cancel);
        self.status = RuntimeStatus::Running;

        Ok(())
    }

    /// Stop ingest and wait for the listener to close
    pub async fn shutdown(&mut self) -> Result<()> {
        if self.status != RuntimeStatus::Running {
            return Ok(());
        }

        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }

        if let Some(handle) = self.ingest_handle.take() {
            if let Err(e) = handle.await {
                self.status = RuntimeStatus::Error;
                return Err(anyhow!("Ingest task failed: {}", e));
            }
        }

        self.status = RuntimeStatus::Stopped;
        Ok(())
    }
}

/// Dropping without `shutdown()` still cancels the ingest task, but
/// cannot wait for it to finish.
impl Drop for HubRuntime {
    fn drop(&mut self) {
        if let Some(cancel) = &self.cancel {
            cancel.cancel();
        }
    }
}

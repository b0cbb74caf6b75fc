use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::hal::{Framing, DEFAULT_MAX_LINE_BYTES};
use crate::hub::NO_DATA_PLACEHOLDER;
use crate::observability::DEFAULT_GAP_REPORT_LIMIT;
use crate::resilience::RetryPolicy;

/// Default ingest address (local producers only)
pub const DEFAULT_ADDRESS: &str = "127.0.0.1";

/// Default ingest port
pub const DEFAULT_PORT: u16 = 9090;

/// Default per-connection read buffer (64KB)
pub const DEFAULT_READ_BUFFER_BYTES: usize = 64 * 1024;

/// Hub and ingest settings.
///
/// Every field has a default, so a config file only needs the fields it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Bind address for the ingest listener
    pub address: String,

    /// Ingest port (0 lets the OS pick)
    pub port: u16,

    /// How records are cut from the byte stream
    pub framing: Framing,

    /// Wait after accept or read failures
    pub retry: RetryPolicy,

    /// Longest accepted text line
    pub max_line_bytes: usize,

    /// Buffered reader capacity per connection
    pub read_buffer_bytes: usize,

    /// Gap positions kept in sync reports
    pub gap_report_limit: usize,

    /// Text served before any data arrives
    pub placeholder: String,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.into(),
            port: DEFAULT_PORT,
            framing: Framing::Lines,
            retry: RetryPolicy::default(),
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            read_buffer_bytes: DEFAULT_READ_BUFFER_BYTES,
            gap_report_limit: DEFAULT_GAP_REPORT_LIMIT,
            placeholder: NO_DATA_PLACEHOLDER.into(),
        }
    }
}

impl HubConfig {
    /// Get the socket address to bind to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: HubConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Framing::Frames { geometry, .. } = &self.framing {
            geometry.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = HubConfig::default();

        assert_eq!(config.address, "127.0.0.1");
        assert_eq!(config.port, 9090);
        assert_eq!(config.framing, Framing::Lines);
        assert_eq!(config.placeholder, "No data received yet.");
        assert_eq!(config.bind_address(), "127.0.0.1:9090");
    }
}

//! The live single-latest-value hub and its ingest listener.

pub mod ingest;
pub mod latest;

pub use ingest::IngestServer;
pub use latest::{CurrentValue, LiveHub, NO_DATA_PLACEHOLDER};

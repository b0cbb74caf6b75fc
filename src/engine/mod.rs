pub mod offline;
pub mod runtime;
pub mod state;

pub use offline::{analyze_capture, AnalysisOptions, AnalysisOutcome, CaptureAnalysis};
pub use runtime::{HubRuntime, RuntimeStatus};
pub use state::IngestState;

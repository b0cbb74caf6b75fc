pub mod capture;
pub mod frame_source;
pub mod line_source;
pub mod mock;
pub mod traits;
pub mod types;

pub use capture::CaptureFile;
pub use frame_source::FrameSource;
pub use line_source::{LineSource, DEFAULT_MAX_LINE_BYTES};
pub use traits::RecordSource;
pub use types::{Framing, ReadOutcome};

pub mod frame;
pub mod record;

pub use frame::{Frame, PacketGeometry, BYTES_PER_SAMPLE};
pub use record::{DecodedRecord, EventMarker, HubRecord};

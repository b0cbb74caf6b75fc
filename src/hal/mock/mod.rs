pub mod device;

pub use device::{EventInjection, SimulatedDevice, SimulatedDeviceConfig};

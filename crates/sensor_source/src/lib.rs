//! # Sensor Source
//!
//! Helmet sensor sources.
//!
//! Responsibilities:
//! - Produce one reading per roster worker on demand
//! - Provide the randomized `SimulatedSource` (biased coin flip)
//! - Provide the hardware-backed `DeviceSource`, bounding every device
//!   query with a timeout and reporting unreachable workers as unavailable

pub mod device;
pub mod error;
pub mod simulated;

pub use contracts::{SensorSource, Sweep, WorkerId};
pub use device::{DeviceProbe, DeviceSource, DEFAULT_DEVICE_TIMEOUT};
pub use error::{Result, SensorSourceError};
pub use simulated::{SimulatedSource, DEFAULT_COMPLIANCE_PROBABILITY};

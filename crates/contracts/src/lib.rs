//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the monitor: data
//! structures, the `SensorSource` / `SnapshotSink` traits, the error taxonomy
//! and the configuration blueprint.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Wall clock (`DateTime<Utc>`) stamps readings and snapshots
//! - `tick` is the scheduler sequence number, used for ordering/diagnostics

mod blueprint;
mod error;
mod reading;
mod sensor_source;
mod sink;
mod snapshot;
mod worker_id;

pub use blueprint::*;
pub use error::*;
pub use reading::*;
pub use sensor_source::*;
pub use sink::*;
pub use snapshot::*;
pub use worker_id::{Roster, WorkerId};

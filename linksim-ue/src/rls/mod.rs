//! RLS (Radio Link Simulation) task for the UE
//!
//! Discovers cells by periodically sending heartbeats to every address in the
//! search space, tracks their signal levels from the acknowledgments, reports
//! cells whose acknowledgments stop as lost, and forwards all other traffic
//! from registered cells to the control plane.
//!
//! # Cell lifecycle
//!
//! ```text
//! HeartbeatAck (new STI) -> registered, cell id assigned, SignalChanged
//! HeartbeatAck (known)   -> last_seen refreshed, SignalChanged if dbm moved
//! no ack > threshold     -> removed, SignalChanged { dbm: SIGNAL_LOST_DBM }
//! ```

pub mod bridge;
pub mod clock;
pub mod context;
mod heartbeat;
pub mod position;
pub mod registry;
mod router;
pub mod task;

pub use bridge::ControlBridge;
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use context::RlsSharedContext;
pub use position::PositionSource;
pub use registry::{AckOutcome, CellInfo, CellRegistry, RegistryError};
pub use task::{RlsTaskError, RlsUdpTask};

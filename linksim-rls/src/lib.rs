//! Radio Link Simulation (RLS) protocol
//!
//! This crate provides the RLS wire protocol spoken between a simulated UE
//! and its candidate cells over UDP.
//!
//! # Protocol Overview
//!
//! - **Heartbeat**: Sent by the UE to every cell in its search space, carrying
//!   its simulated position
//! - **`HeartbeatAck`**: Sent by a cell in response, carrying signal strength
//! - **`PduTransmission`** / **`PduTransmissionAck`**: Payload traffic, passed
//!   through the UE's liveness engine without structural interpretation
//!
//! # Example
//!
//! ```rust
//! use linksim_rls::protocol::{RlsMessage, RlsHeartbeat, Vector3};
//! use linksim_rls::codec;
//!
//! let heartbeat = RlsMessage::Heartbeat(RlsHeartbeat::new(
//!     12345,
//!     Vector3::new(100, 200, 0),
//! ));
//!
//! let encoded = codec::encode(&heartbeat);
//! let decoded = codec::decode(&encoded).unwrap();
//! assert_eq!(heartbeat, decoded);
//! ```

pub mod codec;
pub mod protocol;

pub use codec::{decode, encode, RlsCodecError};
pub use protocol::{
    MessageType, PduType, RlsHeartbeat, RlsHeartbeatAck, RlsMessage, RlsPduTransmission,
    RlsPduTransmissionAck, Vector3,
};

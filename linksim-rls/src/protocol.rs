//! RLS (Radio Link Simulation) message types
//!
//! The UE's liveness engine interprets only heartbeats and their
//! acknowledgments. PDU traffic travels in the same envelope and is handed to
//! the control plane without being looked into.

use bytes::Bytes;

pub use linksim_common::Vector3;

/// Protocol version carried in every header
pub mod version {
    pub const MAJOR: u8 = 3;
    pub const MINOR: u8 = 2;
    pub const PATCH: u8 = 7;
}

/// Message type byte of the RLS header.
///
/// Values 0 to 3 are reserved or retired and never decode to a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    Reserved = 0,
    Deprecated1 = 1,
    Deprecated2 = 2,
    Deprecated3 = 3,
    Heartbeat = 4,
    HeartbeatAck = 5,
    PduTransmission = 6,
    PduTransmissionAck = 7,
}

impl TryFrom<u8> for MessageType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        Ok(match value {
            0 => Self::Reserved,
            1 => Self::Deprecated1,
            2 => Self::Deprecated2,
            3 => Self::Deprecated3,
            4 => Self::Heartbeat,
            5 => Self::HeartbeatAck,
            6 => Self::PduTransmission,
            7 => Self::PduTransmissionAck,
            other => return Err(other),
        })
    }
}

impl MessageType {
    /// Short name used in logs
    pub fn name(self) -> &'static str {
        match self {
            Self::Reserved => "Reserved",
            Self::Deprecated1 | Self::Deprecated2 | Self::Deprecated3 => "Deprecated",
            Self::Heartbeat => "Heartbeat",
            Self::HeartbeatAck => "HeartbeatAck",
            Self::PduTransmission => "PduTransmission",
            Self::PduTransmissionAck => "PduTransmissionAck",
        }
    }
}

/// Kind of payload in a PDU transmission; opaque to the link engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PduType {
    Reserved = 0,
    Rrc = 1,
    Data = 2,
}

impl TryFrom<u8> for PduType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        match value {
            0 => Ok(Self::Reserved),
            1 => Ok(Self::Rrc),
            2 => Ok(Self::Data),
            other => Err(other),
        }
    }
}

/// Every RLS message the codec understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RlsMessage {
    Heartbeat(RlsHeartbeat),
    HeartbeatAck(RlsHeartbeatAck),
    PduTransmission(RlsPduTransmission),
    PduTransmissionAck(RlsPduTransmissionAck),
}

impl RlsMessage {
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::Heartbeat(_) => MessageType::Heartbeat,
            Self::HeartbeatAck(_) => MessageType::HeartbeatAck,
            Self::PduTransmission(_) => MessageType::PduTransmission,
            Self::PduTransmissionAck(_) => MessageType::PduTransmissionAck,
        }
    }

    /// Sender's STI, the registry key for cells
    pub fn sti(&self) -> u64 {
        match self {
            Self::Heartbeat(m) => m.sti,
            Self::HeartbeatAck(m) => m.sti,
            Self::PduTransmission(m) => m.sti,
            Self::PduTransmissionAck(m) => m.sti,
        }
    }
}

/// Liveness heartbeat from a UE, carrying its simulated position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RlsHeartbeat {
    pub sti: u64,
    pub sim_pos: Vector3,
}

impl RlsHeartbeat {
    pub fn new(sti: u64, sim_pos: Vector3) -> Self {
        Self { sti, sim_pos }
    }
}

/// A cell's answer to a heartbeat, with the signal level it measured
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RlsHeartbeatAck {
    pub sti: u64,
    /// Signal level in dBm
    pub dbm: i32,
}

impl RlsHeartbeatAck {
    pub fn new(sti: u64, dbm: i32) -> Self {
        Self { sti, dbm }
    }
}

/// Payload-carrying message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RlsPduTransmission {
    pub sti: u64,
    pub pdu_type: PduType,
    pub pdu_id: u32,
    /// Type-specific tag, e.g. the RRC channel
    pub payload: u32,
    pub pdu: Bytes,
}

impl RlsPduTransmission {
    pub fn new(sti: u64, pdu_type: PduType, pdu_id: u32, payload: u32, pdu: Bytes) -> Self {
        Self {
            sti,
            pdu_type,
            pdu_id,
            payload,
            pdu,
        }
    }
}

/// Acknowledges PDU transmissions by id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RlsPduTransmissionAck {
    pub sti: u64,
    pub pdu_ids: Vec<u32>,
}

impl RlsPduTransmissionAck {
    pub fn new(sti: u64, pdu_ids: Vec<u32>) -> Self {
        Self { sti, pdu_ids }
    }
}

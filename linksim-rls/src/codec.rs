//! RLS message encoding/decoding
//!
//! Wire layout: compatibility marker, three version bytes, message type,
//! 64-bit STI, then the message body. All integers are big-endian.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

use crate::protocol::{
    version, MessageType, PduType, RlsHeartbeat, RlsHeartbeatAck, RlsMessage, RlsPduTransmission,
    RlsPduTransmissionAck, Vector3,
};

/// Maximum PDU length allowed (16KB)
pub const MAX_PDU_LENGTH: usize = 16384;

/// RLS compatibility marker
const RLS_COMPAT_MARKER: u8 = 0x03;

/// marker + version + type + sti
const HEADER_LENGTH: usize = 1 + 3 + 1 + 8;

/// Errors that can occur during RLS message decoding
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RlsCodecError {
    /// Invalid compatibility marker
    #[error("invalid RLS compatibility marker: expected 0x03, got 0x{0:02X}")]
    InvalidCompatMarker(u8),

    /// Version mismatch
    #[error("RLS version mismatch: expected {}.{}.{}, got {}.{}.{}",
            version::MAJOR, version::MINOR, version::PATCH, .0, .1, .2)]
    VersionMismatch(u8, u8, u8),

    /// Unknown message type
    #[error("unknown RLS message type: {0}")]
    UnknownMessageType(u8),

    /// Unknown PDU type
    #[error("unknown PDU type: {0}")]
    UnknownPduType(u8),

    /// PDU too large
    #[error("PDU length {0} exceeds maximum allowed {}", MAX_PDU_LENGTH)]
    PduTooLarge(usize),

    /// Buffer too short
    #[error("buffer too short: need {needed} bytes, have {available}")]
    BufferTooShort {
        /// Number of bytes needed
        needed: usize,
        /// Number of bytes available
        available: usize,
    },

    /// Deprecated message type
    #[error("deprecated message type: {0}")]
    DeprecatedMessageType(u8),
}

/// Result type for RLS codec operations
pub type Result<T> = std::result::Result<T, RlsCodecError>;

/// Encodes an RLS message into a byte buffer
pub fn encode(msg: &RlsMessage) -> Bytes {
    let mut buf = BytesMut::with_capacity(64);
    encode_into(msg, &mut buf);
    buf.freeze()
}

/// Encodes an RLS message into an existing buffer
pub fn encode_into(msg: &RlsMessage, buf: &mut BytesMut) {
    buf.put_u8(RLS_COMPAT_MARKER);
    buf.put_u8(version::MAJOR);
    buf.put_u8(version::MINOR);
    buf.put_u8(version::PATCH);
    buf.put_u8(msg.message_type() as u8);
    buf.put_u64(msg.sti());

    match msg {
        RlsMessage::Heartbeat(m) => {
            buf.put_i32(m.sim_pos.x);
            buf.put_i32(m.sim_pos.y);
            buf.put_i32(m.sim_pos.z);
        }
        RlsMessage::HeartbeatAck(m) => {
            buf.put_i32(m.dbm);
        }
        RlsMessage::PduTransmission(m) => {
            buf.put_u8(m.pdu_type as u8);
            buf.put_u32(m.pdu_id);
            buf.put_u32(m.payload);
            buf.put_u32(m.pdu.len() as u32);
            buf.extend_from_slice(&m.pdu);
        }
        RlsMessage::PduTransmissionAck(m) => {
            buf.put_u32(m.pdu_ids.len() as u32);
            for pdu_id in &m.pdu_ids {
                buf.put_u32(*pdu_id);
            }
        }
    }
}

fn ensure(buf: &[u8], needed: usize) -> Result<()> {
    if buf.len() < needed {
        return Err(RlsCodecError::BufferTooShort {
            needed,
            available: buf.len(),
        });
    }
    Ok(())
}

/// Decodes an RLS message from a byte buffer
pub fn decode(data: &[u8]) -> Result<RlsMessage> {
    let mut buf = data;
    ensure(buf, HEADER_LENGTH)?;

    let marker = buf.get_u8();
    if marker != RLS_COMPAT_MARKER {
        return Err(RlsCodecError::InvalidCompatMarker(marker));
    }

    let major = buf.get_u8();
    let minor = buf.get_u8();
    let patch = buf.get_u8();
    if major != version::MAJOR || minor != version::MINOR || patch != version::PATCH {
        return Err(RlsCodecError::VersionMismatch(major, minor, patch));
    }

    let msg_type_byte = buf.get_u8();
    let msg_type =
        MessageType::try_from(msg_type_byte).map_err(RlsCodecError::UnknownMessageType)?;

    let sti = buf.get_u64();

    match msg_type {
        MessageType::Reserved => Err(RlsCodecError::UnknownMessageType(msg_type_byte)),
        MessageType::Deprecated1 | MessageType::Deprecated2 | MessageType::Deprecated3 => {
            Err(RlsCodecError::DeprecatedMessageType(msg_type_byte))
        }
        MessageType::Heartbeat => decode_heartbeat(sti, buf),
        MessageType::HeartbeatAck => decode_heartbeat_ack(sti, buf),
        MessageType::PduTransmission => decode_pdu_transmission(sti, buf),
        MessageType::PduTransmissionAck => decode_pdu_transmission_ack(sti, buf),
    }
}

fn decode_heartbeat(sti: u64, mut buf: &[u8]) -> Result<RlsMessage> {
    ensure(buf, 12)?;
    let x = buf.get_i32();
    let y = buf.get_i32();
    let z = buf.get_i32();

    Ok(RlsMessage::Heartbeat(RlsHeartbeat::new(
        sti,
        Vector3::new(x, y, z),
    )))
}

fn decode_heartbeat_ack(sti: u64, mut buf: &[u8]) -> Result<RlsMessage> {
    ensure(buf, 4)?;
    let dbm = buf.get_i32();

    Ok(RlsMessage::HeartbeatAck(RlsHeartbeatAck::new(sti, dbm)))
}

fn decode_pdu_transmission(sti: u64, mut buf: &[u8]) -> Result<RlsMessage> {
    // pdu_type(1) + pdu_id(4) + payload(4) + pdu_length(4)
    ensure(buf, 13)?;

    let pdu_type_byte = buf.get_u8();
    let pdu_type = PduType::try_from(pdu_type_byte).map_err(RlsCodecError::UnknownPduType)?;

    let pdu_id = buf.get_u32();
    let payload = buf.get_u32();
    let pdu_length = buf.get_u32() as usize;

    if pdu_length > MAX_PDU_LENGTH {
        return Err(RlsCodecError::PduTooLarge(pdu_length));
    }
    ensure(buf, pdu_length)?;

    Ok(RlsMessage::PduTransmission(RlsPduTransmission {
        sti,
        pdu_type,
        pdu_id,
        payload,
        pdu: Bytes::copy_from_slice(&buf[..pdu_length]),
    }))
}

fn decode_pdu_transmission_ack(sti: u64, mut buf: &[u8]) -> Result<RlsMessage> {
    ensure(buf, 4)?;
    let count = buf.get_u32() as usize;
    ensure(buf, count.saturating_mul(4))?;

    let pdu_ids = (0..count).map(|_| buf.get_u32()).collect();

    Ok(RlsMessage::PduTransmissionAck(
        RlsPduTransmissionAck::new(sti, pdu_ids),
    ))
}

//! RTP/RTCP header classification
//!
//! Only the fields needed for SSRC demultiplexing are read here; everything
//! else in the headers is left to the transport layer.
//!
//! RTP fixed header (RFC 3550 §5.1):
//! ```text
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-------------------------------+
//! |V=2|P|X|  CC   |M|     PT      |       sequence number         |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-------------------------------+
//! |                           timestamp                           |
//! +---------------------------------------------------------------+
//! |                             SSRC                              |
//! +---------------------------------------------------------------+
//! ```
//!
//! RTCP common header (RFC 3550 §6.4.1):
//! ```text
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-------------------------------+
//! |V=2|P|   RC    |      PT       |            length             |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-------------------------------+
//! |                       SSRC of sender                          |
//! +---------------------------------------------------------------+
//! ```
//!
//! The second byte is read as an RTCP packet type; RTP payload types are
//! chosen so that the marker bit plus payload type never lands in 200..=206.

/// Minimum length of an RTP header carrying an SSRC
pub const RTP_HEADER_LEN: usize = 12;

/// Minimum length of an RTCP header carrying a sender SSRC
pub const RTCP_HEADER_LEN: usize = 8;

const RTP_SSRC_OFFSET: usize = 8;
const RTCP_SSRC_OFFSET: usize = 4;

/// RTCP packet type (second header byte)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtcpPacketType {
    /// Sender report
    SenderReport = 200,
    /// Receiver report
    ReceiverReport = 201,
    /// Source description
    SourceDescription = 202,
    /// Goodbye
    Goodbye = 203,
    /// Application-defined
    Application = 204,
    /// Transport-layer feedback (NACK, TWCC)
    TransportFeedback = 205,
    /// Payload-specific feedback (PLI, FIR, REMB)
    PayloadFeedback = 206,
}

impl RtcpPacketType {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            200 => Some(RtcpPacketType::SenderReport),
            201 => Some(RtcpPacketType::ReceiverReport),
            202 => Some(RtcpPacketType::SourceDescription),
            203 => Some(RtcpPacketType::Goodbye),
            204 => Some(RtcpPacketType::Application),
            205 => Some(RtcpPacketType::TransportFeedback),
            206 => Some(RtcpPacketType::PayloadFeedback),
            _ => None,
        }
    }

    /// Check if this packet type belongs on the feedback path
    pub fn is_feedback(&self) -> bool {
        matches!(
            self,
            RtcpPacketType::ReceiverReport
                | RtcpPacketType::TransportFeedback
                | RtcpPacketType::PayloadFeedback
        )
    }
}

/// Classification of an inbound packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketKind {
    /// RTP media packet
    Rtp,
    /// RTCP control packet
    Rtcp(RtcpPacketType),
}

impl PacketKind {
    /// Classify a packet by its second header byte
    ///
    /// Returns `None` for packets too short to carry a packet type.
    pub fn classify(packet: &[u8]) -> Option<Self> {
        let pt = *packet.get(1)?;
        Some(match RtcpPacketType::from_byte(pt) {
            Some(rtcp) => PacketKind::Rtcp(rtcp),
            None => PacketKind::Rtp,
        })
    }

    /// Check if this packet belongs on the feedback path
    pub fn is_feedback(&self) -> bool {
        match self {
            PacketKind::Rtcp(pt) => pt.is_feedback(),
            PacketKind::Rtp => false,
        }
    }
}

fn read_u32(packet: &[u8], offset: usize) -> Option<u32> {
    let bytes = packet.get(offset..offset + 4)?;
    Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Read the SSRC from an RTP header
pub fn rtp_ssrc(packet: &[u8]) -> Option<u32> {
    if packet.len() < RTP_HEADER_LEN {
        return None;
    }
    read_u32(packet, RTP_SSRC_OFFSET)
}

/// Read the sender SSRC from an RTCP header
pub fn rtcp_sender_ssrc(packet: &[u8]) -> Option<u32> {
    if packet.len() < RTCP_HEADER_LEN {
        return None;
    }
    read_u32(packet, RTCP_SSRC_OFFSET)
}

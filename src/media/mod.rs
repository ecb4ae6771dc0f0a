//! Media types shared by the gateway
//!
//! This module provides:
//! - Media kind and frame format identifiers
//! - Well-known RTP payload types
//! - RTP/RTCP header classification
//! - Capability traits for media sources and sinks

pub mod frame;
pub mod rtp;
pub mod sink;

pub use frame::{DataContentType, Frame, FrameFormat, MediaType};
pub use rtp::{PacketKind, RtcpPacketType};
pub use sink::{FeedbackSink, FeedbackSource, MediaSink, MediaSource};

/// Opus audio, 48 kHz
pub const OPUS_48000_PT: u8 = 120;
/// VP8 video, 90 kHz clock
pub const VP8_90000_PT: u8 = 100;
/// H.264 video, 90 kHz clock
pub const H264_90000_PT: u8 = 127;

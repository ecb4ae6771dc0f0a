//! Frame and format types for media routing
//!
//! This module defines the identifiers that travel with every buffer the
//! gateway fans out, and the frame handed to video transcoders.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::{H264_90000_PT, VP8_90000_PT};

/// Kind of media carried by a packet or buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Audio,
    Video,
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaType::Audio => write!(f, "audio"),
            MediaType::Video => write!(f, "video"),
        }
    }
}

/// Encoded video frame format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameFormat {
    #[default]
    Unknown,
    Vp8,
    H264,
}

impl FrameFormat {
    /// Map an RTP video payload type to a frame format
    ///
    /// Anything other than VP8 or H.264 yields `Unknown`.
    pub fn from_payload_type(payload_type: u8) -> Self {
        match payload_type {
            VP8_90000_PT => FrameFormat::Vp8,
            H264_90000_PT => FrameFormat::H264,
            _ => FrameFormat::Unknown,
        }
    }

    /// Transcoder output stream id used for this format
    pub fn output_stream_id(&self) -> Option<u32> {
        match self {
            FrameFormat::Vp8 => Some(0),
            FrameFormat::H264 => Some(1),
            FrameFormat::Unknown => None,
        }
    }
}

impl std::fmt::Display for FrameFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameFormat::Unknown => write!(f, "unknown"),
            FrameFormat::Vp8 => write!(f, "VP8"),
            FrameFormat::H264 => write!(f, "H.264"),
        }
    }
}

/// Shape of the data a source delivers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataContentType {
    /// Raw RTP packets
    #[default]
    Rtp,
    /// Complete encoded frames
    EncodedFrame,
}

/// An encoded video frame handed to a transcoder
///
/// Cheap to clone: the payload is reference counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Format recorded for the publisher that produced the frame
    pub format: FrameFormat,
    /// Encoded payload
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame
    pub fn new(format: FrameFormat, payload: Bytes) -> Self {
        Self { format, payload }
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Check if the payload is empty
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

//! Media source and sink capabilities
//!
//! Publishers, subscribers, local passthrough sinks and muxing outputs all
//! talk to the gateway through these traits. Implementations must be
//! thread-safe: the gateway calls them from the media delivery thread and
//! from control-plane threads concurrently.

use std::sync::Arc;

use bytes::Bytes;

use super::frame::DataContentType;

/// Receiver of control-plane feedback (RTCP reports, NACK, PLI, REMB)
pub trait FeedbackSink: Send + Sync {
    /// Deliver an opaque feedback buffer, returning the number of bytes handled
    fn deliver_feedback(&self, data: Bytes) -> usize;
}

/// Producer of control-plane feedback
pub trait FeedbackSource: Send + Sync {
    /// Install (or clear) the sink that receives this source's feedback
    fn set_feedback_sink(&self, sink: Option<Arc<dyn FeedbackSink>>);
}

/// Receiver of audio/video data
///
/// Raw passthrough sinks only need the two delivery methods. Subscriber
/// sinks also carry the SSRCs the gateway assigned to them and the payload
/// types they would like to receive.
pub trait MediaSink: Send + Sync {
    /// Deliver an audio buffer, returning the number of bytes accepted
    fn deliver_audio_data(&self, data: Bytes) -> usize;

    /// Deliver a video buffer, returning the number of bytes accepted
    fn deliver_video_data(&self, data: Bytes) -> usize;

    /// SSRC of the audio stream this sink receives
    fn audio_sink_ssrc(&self) -> u32 {
        0
    }

    /// SSRC of the video stream this sink receives
    fn video_sink_ssrc(&self) -> u32 {
        0
    }

    fn set_audio_sink_ssrc(&self, _ssrc: u32) {}

    fn set_video_sink_ssrc(&self, _ssrc: u32) {}

    /// Audio payload type this sink prefers to receive
    fn preferred_audio_payload_type(&self) -> u8 {
        super::OPUS_48000_PT
    }

    /// Video payload type this sink prefers to receive
    fn preferred_video_payload_type(&self) -> u8 {
        super::VP8_90000_PT
    }

    /// Whether the sink asks for retransmitted (NACKed) packets
    fn accepts_retransmission(&self) -> bool {
        false
    }

    /// Whether the sink asks for forward error correction
    fn accepts_fec(&self) -> bool {
        false
    }

    /// Feedback produced by this sink, if any
    fn feedback_source(&self) -> Option<Arc<dyn FeedbackSource>> {
        None
    }
}

/// A publisher's media source
pub trait MediaSource: Send + Sync {
    fn audio_source_ssrc(&self) -> u32;

    fn video_source_ssrc(&self) -> u32;

    fn audio_data_type(&self) -> DataContentType;

    fn video_data_type(&self) -> DataContentType;

    fn audio_payload_type(&self) -> u8;

    fn video_payload_type(&self) -> u8;

    /// Sink that accepts feedback addressed to this source
    fn feedback_sink(&self) -> Option<Arc<dyn FeedbackSink>>;

    /// Install (or clear) the target for this source's audio
    fn set_audio_sink(&self, sink: Option<Arc<dyn MediaSink>>);

    /// Install (or clear) the target for this source's video
    fn set_video_sink(&self, sink: Option<Arc<dyn MediaSink>>);

    /// Ask the source for a full intra frame, returning its status code
    fn send_fir_packet(&self) -> i32;

    fn set_video_codec(&self, codec_name: &str, clock_rate: u32) -> i32;

    fn set_audio_codec(&self, codec_name: &str, clock_rate: u32) -> i32;
}

//! Video transcoder and frame sender interfaces

use std::sync::Arc;

use super::transport::RtpTransport;
use crate::media::{FeedbackSink, Frame, FrameFormat, MediaSource};

/// Settings for a transcoder output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSettings {
    /// Output stream id (see [`FrameFormat::output_stream_id`])
    pub id: u32,
    pub format: FrameFormat,
    pub frame_rate: u32,
    pub bitrate_kbps: u32,
}

/// Settings for constructing a frame sender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SenderSettings {
    pub output_id: u32,
    pub format: FrameFormat,
    /// Target bitrate (0 lets the sender decide)
    pub target_kbps: u32,
}

/// Transcodes the publisher's frames into one or more output formats
///
/// Frames delivered while no input is set must be dropped silently: the
/// gateway does not wait for in-flight frames when the publisher detaches.
pub trait VideoTranscoder: Send + Sync {
    /// Register the incoming format; `source` is `None` until a live
    /// frame provider is wired in
    fn set_input(&self, format: FrameFormat, source: Option<Arc<dyn MediaSource>>) -> bool;

    fn unset_input(&self);

    /// Register `sender` as the named output
    fn activate_output(&self, settings: OutputSettings, sender: Arc<dyn FrameSender>) -> bool;

    fn on_frame(&self, frame: Frame);
}

/// Packetizes encoded frames and sends them over an [`RtpTransport`]
pub trait FrameSender: Send + Sync {
    fn set_send_codec(&self, format: FrameFormat, width: u32, height: u32) -> bool;

    /// Start (or update) sending; calling again updates the loss-recovery flags
    fn start_send(&self, nack: bool, fec: bool);

    /// Outbound SSRC for the given loss-recovery flags
    fn send_ssrc(&self, nack: bool, fec: bool) -> u32;

    fn feedback_sink(&self) -> Option<Arc<dyn FeedbackSink>>;
}

/// Factory for transcoders and senders
pub trait VideoBackend: Send + Sync {
    fn create_transcoder(&self) -> Arc<dyn VideoTranscoder>;

    /// Create a sender fed by `transcoder`, emitting through `transport`
    fn create_sender(
        &self,
        settings: SenderSettings,
        transcoder: &Arc<dyn VideoTranscoder>,
        transport: RtpTransport,
    ) -> Arc<dyn FrameSender>;
}

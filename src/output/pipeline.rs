//! A single pooled video output

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::engine::FrameSender;
use crate::media::{FeedbackSink, FrameFormat};

/// Sender producing one outbound format from its pooled transcoder
///
/// Shared by every subscriber that asked for `payload_type`. The
/// transcoder feeding the sender is owned by the pool's transcoder list.
pub struct VideoOutputPipeline {
    payload_type: u8,
    format: FrameFormat,
    sender: Arc<dyn FrameSender>,
    ssrc: AtomicU32,
}

impl VideoOutputPipeline {
    pub fn new(
        payload_type: u8,
        format: FrameFormat,
        sender: Arc<dyn FrameSender>,
    ) -> Self {
        Self {
            payload_type,
            format,
            sender,
            ssrc: AtomicU32::new(0),
        }
    }

    /// (Re)start sending with the given loss-recovery flags
    ///
    /// Returns the outbound SSRC for those flags.
    pub fn start(&self, nack: bool, fec: bool) -> u32 {
        self.sender.start_send(nack, fec);
        let ssrc = self.sender.send_ssrc(nack, fec);
        self.ssrc.store(ssrc, Ordering::Relaxed);
        ssrc
    }

    /// Outbound SSRC from the most recent start
    pub fn ssrc(&self) -> u32 {
        self.ssrc.load(Ordering::Relaxed)
    }

    pub fn payload_type(&self) -> u8 {
        self.payload_type
    }

    pub fn format(&self) -> FrameFormat {
        self.format
    }

    pub fn feedback_sink(&self) -> Option<Arc<dyn FeedbackSink>> {
        self.sender.feedback_sink()
    }
}

impl std::fmt::Debug for VideoOutputPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoOutputPipeline")
            .field("payload_type", &self.payload_type)
            .field("format", &self.format)
            .field("ssrc", &self.ssrc())
            .finish()
    }
}

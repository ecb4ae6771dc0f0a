//! Subscriber entry types
//!
//! This module defines the per-subscriber state stored in the registry.

use std::sync::Arc;

use crate::engine::ChannelHandle;
use crate::media::{FeedbackSink, MediaSink};

/// Entry for a single subscriber in the registry
#[derive(Clone)]
pub struct SubscriberEntry {
    /// Sink receiving the subscriber's media
    pub sink: Arc<dyn MediaSink>,

    /// Payload type keying the shared video output (None if unsupported)
    pub video_output: Option<u8>,

    /// Audio channel allocated by the audio engine
    pub audio_channel: ChannelHandle,
}

impl SubscriberEntry {
    /// Create a new subscriber entry
    pub fn new(
        sink: Arc<dyn MediaSink>,
        video_output: Option<u8>,
        audio_channel: ChannelHandle,
    ) -> Self {
        Self {
            sink,
            video_output,
            audio_channel,
        }
    }

    /// Point the subscriber's feedback source at `target`
    ///
    /// Returns true if the subscriber exposes a feedback source.
    pub fn wire_feedback(&self, target: Arc<dyn FeedbackSink>) -> bool {
        match self.sink.feedback_source() {
            Some(source) => {
                source.set_feedback_sink(Some(target));
                true
            }
            None => false,
        }
    }

    /// Detach the subscriber's feedback source from the gateway
    pub fn unwire_feedback(&self) {
        if let Some(source) = self.sink.feedback_source() {
            source.set_feedback_sink(None);
        }
    }
}

impl std::fmt::Debug for SubscriberEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberEntry")
            .field("audio_ssrc", &self.sink.audio_sink_ssrc())
            .field("video_ssrc", &self.sink.video_sink_ssrc())
            .field("video_output", &self.video_output)
            .field("audio_channel", &self.audio_channel)
            .finish()
    }
}

//! Audio engine interface

use std::sync::Arc;

use bytes::Bytes;

use super::transport::RtpTransport;
use crate::media::{DataContentType, FeedbackSink};

/// Handle of an audio output channel allocated by the engine
pub type ChannelHandle = i32;

/// Parameters for registering an audio source with the engine
#[derive(Clone)]
pub struct AudioSource<'a> {
    pub ssrc: u32,
    pub is_publisher: bool,
    pub data_type: DataContentType,
    pub payload_type: u8,
    /// Where the engine sends feedback addressed to this source
    pub feedback_sink: Option<Arc<dyn FeedbackSink>>,
    pub id: &'a str,
}

impl std::fmt::Debug for AudioSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioSource")
            .field("ssrc", &self.ssrc)
            .field("is_publisher", &self.is_publisher)
            .field("data_type", &self.data_type)
            .field("payload_type", &self.payload_type)
            .field("has_feedback_sink", &self.feedback_sink.is_some())
            .field("id", &self.id)
            .finish()
    }
}

/// Audio mixing/transcoding engine
pub trait AudioEngine: Send + Sync {
    /// Hand the engine the transport its encoded output is sent through
    fn attach_transport(&self, _transport: RtpTransport) {}

    fn add_source(&self, source: AudioSource<'_>) -> bool;

    fn remove_source(&self, ssrc: u32, is_publisher: bool) -> bool;

    /// Allocate an output channel for a subscriber
    fn add_output(&self, id: &str, payload_type: u8) -> ChannelHandle;

    /// SSRC the engine sends with on `channel`
    fn send_ssrc(&self, channel: ChannelHandle) -> u32;

    fn deliver_audio_data(&self, data: Bytes) -> usize;

    fn deliver_feedback(&self, data: Bytes) -> usize;
}

//! Muxer-backed outputs
//!
//! An external output records the conference to a file or pushes it to a
//! stream server. It joins the gateway as an ordinary subscriber: the
//! gateway assigns it SSRCs, and the packets demultiplexed to it are handed
//! to the muxer.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use serde::Deserialize;

use crate::engine::MediaMuxer;
use crate::error::{GatewayError, Result};
use crate::media::MediaSink;

/// Parsed external output configuration document
///
/// Only `id` is interpreted here; the remaining fields belong to the muxer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExternalOutputConfig {
    #[serde(default)]
    pub id: String,

    #[serde(flatten)]
    pub options: serde_json::Map<String, serde_json::Value>,
}

impl ExternalOutputConfig {
    /// Parse a configuration document
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() || raw == "undefined" {
            return Err(GatewayError::InvalidOutputConfig(
                "configuration document is empty".into(),
            ));
        }

        let config: Self = serde_json::from_str(raw)
            .map_err(|e| GatewayError::InvalidOutputConfig(e.to_string()))?;

        if config.id.is_empty() {
            return Err(GatewayError::InvalidOutputConfig("missing output id".into()));
        }

        Ok(config)
    }
}

/// Subscriber sink that feeds a [`MediaMuxer`]
pub struct ExternalOutput {
    id: String,
    muxer: Arc<dyn MediaMuxer>,
    audio_ssrc: AtomicU32,
    video_ssrc: AtomicU32,
}

impl ExternalOutput {
    pub fn new(id: impl Into<String>, muxer: Arc<dyn MediaMuxer>) -> Self {
        Self {
            id: id.into(),
            muxer,
            audio_ssrc: AtomicU32::new(0),
            video_ssrc: AtomicU32::new(0),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl MediaSink for ExternalOutput {
    fn deliver_audio_data(&self, data: Bytes) -> usize {
        self.muxer.on_audio_packet(data)
    }

    fn deliver_video_data(&self, data: Bytes) -> usize {
        self.muxer.on_video_packet(data)
    }

    fn audio_sink_ssrc(&self) -> u32 {
        self.audio_ssrc.load(Ordering::Relaxed)
    }

    fn video_sink_ssrc(&self) -> u32 {
        self.video_ssrc.load(Ordering::Relaxed)
    }

    fn set_audio_sink_ssrc(&self, ssrc: u32) {
        self.audio_ssrc.store(ssrc, Ordering::Relaxed);
    }

    fn set_video_sink_ssrc(&self, ssrc: u32) {
        self.video_ssrc.store(ssrc, Ordering::Relaxed);
    }

    fn preferred_audio_payload_type(&self) -> u8 {
        self.muxer.audio_payload_type()
    }

    fn preferred_video_payload_type(&self) -> u8 {
        self.muxer.video_payload_type()
    }
}

impl std::fmt::Debug for ExternalOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalOutput")
            .field("id", &self.id)
            .field("audio_ssrc", &self.audio_sink_ssrc())
            .field("video_ssrc", &self.video_sink_ssrc())
            .finish()
    }
}

//! Muxer factory interface for external (file/stream) outputs

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;

/// Events reported by a muxer over its lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MuxerEvent {
    /// Muxer opened its output and is writing
    Started { id: String },

    /// Muxer finished and closed its output
    Stopped { id: String },

    /// Error occurred
    Error { id: String, message: String },
}

/// A muxing output sink
pub trait MediaMuxer: Send + Sync {
    fn on_audio_packet(&self, data: Bytes) -> usize;

    fn on_video_packet(&self, data: Bytes) -> usize;

    /// Audio payload type the container expects
    fn audio_payload_type(&self) -> u8;

    /// Video payload type the container expects
    fn video_payload_type(&self) -> u8;
}

/// Creates and recycles muxers keyed by output id
pub trait MuxerFactory: Send + Sync {
    /// Create a muxer for `id` from the raw configuration document
    ///
    /// Returns `None` if the muxer cannot be created.
    fn create_muxer(
        &self,
        id: &str,
        config: &str,
        events: mpsc::Sender<MuxerEvent>,
    ) -> Option<Arc<dyn MediaMuxer>>;

    /// Close and release the muxer for `id`
    fn recycle_muxer(&self, id: &str) -> bool;
}

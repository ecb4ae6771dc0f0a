//! Publisher slot
//!
//! Holds the one publisher feeding the gateway. Attach and detach are
//! single-writer; readers copy what they need out of the slot and release
//! the lock before calling into the publisher.
//!
//! The attach and detach hooks run under the exclusive lock, so state
//! derived from the publisher (the transcoders' input format) changes in
//! step with the slot.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{GatewayError, Result};
use crate::media::{DataContentType, FeedbackSink, FrameFormat, MediaSource};

/// Metadata recorded for the attached publisher
#[derive(Clone)]
pub struct PublisherInfo {
    pub id: String,
    pub source: Arc<dyn MediaSource>,
    /// Incoming video format, derived from the video payload type
    pub format: FrameFormat,
    pub audio_ssrc: u32,
    pub video_ssrc: u32,
    pub audio_payload_type: u8,
    pub video_payload_type: u8,
    pub audio_data_type: DataContentType,
    pub video_data_type: DataContentType,
    pub feedback_sink: Option<Arc<dyn FeedbackSink>>,
}

impl PublisherInfo {
    /// Record what `source` negotiated
    pub fn from_source(id: &str, source: Arc<dyn MediaSource>) -> Self {
        let video_payload_type = source.video_payload_type();
        Self {
            id: id.to_string(),
            format: FrameFormat::from_payload_type(video_payload_type),
            audio_ssrc: source.audio_source_ssrc(),
            video_ssrc: source.video_source_ssrc(),
            audio_payload_type: source.audio_payload_type(),
            video_payload_type,
            audio_data_type: source.audio_data_type(),
            video_data_type: source.video_data_type(),
            feedback_sink: source.feedback_sink(),
            source,
        }
    }
}

impl std::fmt::Debug for PublisherInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublisherInfo")
            .field("id", &self.id)
            .field("format", &self.format)
            .field("audio_ssrc", &self.audio_ssrc)
            .field("video_ssrc", &self.video_ssrc)
            .field("audio_payload_type", &self.audio_payload_type)
            .field("video_payload_type", &self.video_payload_type)
            .finish()
    }
}

/// Single-writer holder for the active publisher
#[derive(Default)]
pub struct PublisherSlot {
    publisher: RwLock<Option<PublisherInfo>>,
}

impl PublisherSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `info` if the slot is empty, running `on_attach` first
    pub fn attach<F>(&self, info: PublisherInfo, on_attach: F) -> Result<()>
    where
        F: FnOnce(&PublisherInfo),
    {
        let mut publisher = self.publisher.write();

        if let Some(current) = publisher.as_ref() {
            return Err(GatewayError::PublisherAlreadyAttached {
                current: current.id.clone(),
                rejected: info.id,
            });
        }

        on_attach(&info);
        *publisher = Some(info);
        Ok(())
    }

    /// Clear the slot if `id` is the attached publisher and `precondition`
    /// holds, running `on_detach` on the removed publisher
    ///
    /// The slot is untouched if `precondition` fails.
    pub fn detach<P, F>(&self, id: &str, precondition: P, on_detach: F) -> Result<PublisherInfo>
    where
        P: FnOnce() -> Result<()>,
        F: FnOnce(&PublisherInfo),
    {
        let mut publisher = self.publisher.write();

        match publisher.as_ref() {
            Some(current) if current.id == id => {}
            other => {
                return Err(GatewayError::PublisherMismatch {
                    expected: other.map(|p| p.id.clone()),
                    actual: id.to_string(),
                })
            }
        }

        precondition()?;

        let info = publisher.take().ok_or(GatewayError::NoPublisher)?;
        on_detach(&info);
        Ok(info)
    }

    /// Clear the slot unconditionally
    pub fn take<F>(&self, on_detach: F) -> Option<PublisherInfo>
    where
        F: FnOnce(&PublisherInfo),
    {
        let mut publisher = self.publisher.write();
        let info = publisher.take()?;
        on_detach(&info);
        Some(info)
    }

    /// Source of the attached publisher
    pub fn source(&self) -> Result<Arc<dyn MediaSource>> {
        self.publisher
            .read()
            .as_ref()
            .map(|p| Arc::clone(&p.source))
            .ok_or(GatewayError::NoPublisher)
    }

    /// Incoming video format, `Unknown` when no publisher is attached
    pub fn format(&self) -> FrameFormat {
        self.publisher
            .read()
            .as_ref()
            .map(|p| p.format)
            .unwrap_or_default()
    }

    pub fn id(&self) -> Option<String> {
        self.publisher.read().as_ref().map(|p| p.id.clone())
    }

    pub fn is_attached(&self) -> bool {
        self.publisher.read().is_some()
    }
}

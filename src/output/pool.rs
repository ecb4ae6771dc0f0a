//! Video output pool
//!
//! One pipeline per distinct output payload type, created on first request
//! and kept for the lifetime of the pool. Removing the last subscriber of a
//! format does not tear its pipeline down.
//!
//! Two locks guard the pool: `transcoders` is the ordered sequence frame
//! delivery walks together with the input format they are bound to,
//! `outputs` is the payload-type map used for lookups and feedback. Frame
//! delivery only ever takes the first.
//!
//! A new transcoder is bound and listed under one `transcoders` write lock,
//! so it either sees the current input format or is rebound by the next
//! [`VideoOutputPool::bind_input`].

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockUpgradableReadGuard};

use super::pipeline::VideoOutputPipeline;
use crate::engine::{
    OutputSettings, RtpTransport, SenderSettings, VideoBackend, VideoTranscoder,
};
use crate::gateway::GatewayConfig;
use crate::media::{FeedbackSink, Frame, FrameFormat};

/// Transcoders in creation order and the input they are bound to
#[derive(Default)]
struct Transcoders {
    input: FrameFormat,
    list: Vec<Arc<dyn VideoTranscoder>>,
}

/// Lazily-populated pool of video outputs keyed by payload type
pub struct VideoOutputPool {
    backend: Arc<dyn VideoBackend>,
    config: GatewayConfig,
    transport: RtpTransport,

    transcoders: RwLock<Transcoders>,

    /// Pipelines keyed by output payload type
    outputs: RwLock<HashMap<u8, VideoOutputPipeline>>,
}

impl VideoOutputPool {
    /// Create an empty pool
    ///
    /// Every sender created by the pool emits through a clone of `transport`.
    pub fn new(backend: Arc<dyn VideoBackend>, config: GatewayConfig, transport: RtpTransport) -> Self {
        Self {
            backend,
            config,
            transport,
            transcoders: RwLock::new(Transcoders::default()),
            outputs: RwLock::new(HashMap::new()),
        }
    }

    /// Get the output for `payload_type`, creating it if needed
    ///
    /// An existing output's sender is restarted with the requested flags.
    /// New outputs are bound to the pool's current input format.
    /// Returns the outbound SSRC, or 0 if `payload_type` maps to no
    /// supported format (no pipeline is created).
    pub fn get_or_create(&self, payload_type: u8, nack: bool, fec: bool) -> u32 {
        let outputs = self.outputs.upgradable_read();

        if let Some(pipeline) = outputs.get(&payload_type) {
            tracing::trace!(
                payload_type = pipeline.payload_type(),
                format = %pipeline.format(),
                nack,
                fec,
                "Video output restarted"
            );
            return pipeline.start(nack, fec);
        }

        let format = FrameFormat::from_payload_type(payload_type);
        let Some(output_id) = format.output_stream_id() else {
            tracing::debug!(payload_type, "No video output format for payload type");
            return 0;
        };

        let transcoder = self.backend.create_transcoder();

        let sender = self.backend.create_sender(
            SenderSettings {
                output_id,
                format,
                target_kbps: self.config.video_output_kbps,
            },
            &transcoder,
            self.transport.clone().with_stream_id(output_id),
        );

        transcoder.activate_output(
            OutputSettings {
                id: output_id,
                format,
                frame_rate: self.config.transcoder_frame_rate,
                bitrate_kbps: self.config.transcoder_bitrate_kbps,
            },
            Arc::clone(&sender),
        );

        let input = {
            let mut transcoders = self.transcoders.write();
            transcoder.set_input(transcoders.input, None);
            transcoders.list.push(Arc::clone(&transcoder));
            transcoders.input
        };

        // TODO: derive the target size from the publisher's actual resolution
        sender.set_send_codec(format, self.config.target_width, self.config.target_height);

        let pipeline = VideoOutputPipeline::new(payload_type, format, sender);
        let ssrc = pipeline.start(nack, fec);

        let mut outputs = RwLockUpgradableReadGuard::upgrade(outputs);
        outputs.insert(payload_type, pipeline);

        tracing::info!(
            payload_type,
            format = %format,
            input = %input,
            ssrc,
            outputs = outputs.len(),
            "Video output created"
        );

        ssrc
    }

    /// Feed a frame to every transcoder, in creation order
    ///
    /// Returns the number of transcoders fed.
    pub fn deliver_frame(&self, frame: &Frame) -> usize {
        let transcoders = self.transcoders.read();
        for transcoder in &transcoders.list {
            transcoder.on_frame(frame.clone());
        }
        transcoders.list.len()
    }

    /// Visit the feedback sink of every output's sender
    pub fn for_each_feedback_sink<F>(&self, mut f: F)
    where
        F: FnMut(&Arc<dyn FeedbackSink>),
    {
        let outputs = self.outputs.read();
        for pipeline in outputs.values() {
            if let Some(sink) = pipeline.feedback_sink() {
                f(&sink);
            }
        }
    }

    /// Detach every transcoder from its input; pipelines stay pooled
    ///
    /// Transcoders created afterwards are bound to `Unknown` until the next
    /// [`bind_input`](Self::bind_input).
    pub fn unset_inputs(&self) {
        let mut transcoders = self.transcoders.write();
        transcoders.input = FrameFormat::Unknown;
        for transcoder in &transcoders.list {
            transcoder.unset_input();
        }
    }

    /// Bind every transcoder, present and future, to `format`
    pub fn bind_input(&self, format: FrameFormat) {
        let mut transcoders = self.transcoders.write();
        transcoders.input = format;
        for transcoder in &transcoders.list {
            transcoder.set_input(format, None);
        }
    }

    /// Outbound SSRC of the output for `payload_type`, if it exists
    pub fn ssrc(&self, payload_type: u8) -> Option<u32> {
        self.outputs.read().get(&payload_type).map(|p| p.ssrc())
    }

    /// Get the number of outputs
    pub fn len(&self) -> usize {
        self.outputs.read().len()
    }

    /// Check if no output has been created
    pub fn is_empty(&self) -> bool {
        self.outputs.read().is_empty()
    }
}

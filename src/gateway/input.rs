//! Input gateway orchestrator

use std::sync::{Arc, Weak};

use bytes::Bytes;
use parking_lot::RwLock;
use tokio::sync::mpsc;

use super::config::GatewayConfig;
use super::publisher::{PublisherInfo, PublisherSlot};
use crate::engine::{
    AudioEngine, AudioSource, MuxerEvent, MuxerFactory, RtpReceiver, RtpTransport, VideoBackend,
};
use crate::error::{GatewayError, Result};
use crate::media::{
    DataContentType, FeedbackSink, Frame, FrameFormat, MediaSink, MediaSource, MediaType,
};
use crate::output::{ExternalOutput, ExternalOutputConfig, VideoOutputPool};
use crate::registry::{RegistryError, SubscriberEntry, SubscriberRegistry};
use crate::routing::{demux, FeedbackRouter};
use crate::stats::{GatewayMetrics, GatewayStats};

/// Local passthrough sinks for raw incoming media
#[derive(Default)]
struct LocalSinks {
    audio: Option<Arc<dyn MediaSink>>,
    video: Option<Arc<dyn MediaSink>>,
}

/// Media-routing core between one publisher and many subscribers
///
/// Create with [`InputGateway::new`]; the gateway is always held in an
/// `Arc` so it can register itself as the publisher's sink and as the
/// subscribers' feedback target.
///
/// `deliver_audio_data` and `deliver_video_data` assume a single producer:
/// frames of one publisher must be delivered from one thread.
pub struct InputGateway {
    config: GatewayConfig,
    audio: Arc<dyn AudioEngine>,
    muxers: Arc<dyn MuxerFactory>,
    publisher: PublisherSlot,
    subscribers: SubscriberRegistry,
    outputs: VideoOutputPool,
    local_sinks: RwLock<LocalSinks>,
    metrics: GatewayMetrics,
    this: Weak<InputGateway>,
}

impl InputGateway {
    /// Create a gateway over the given collaborators
    ///
    /// The audio engine and every video sender emit through transports that
    /// loop back into [`RtpReceiver::receive_rtp_data`].
    pub fn new(
        audio: Arc<dyn AudioEngine>,
        video: Arc<dyn VideoBackend>,
        muxers: Arc<dyn MuxerFactory>,
        config: GatewayConfig,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this: &Weak<Self>| {
            let receiver: Weak<dyn RtpReceiver> = this.clone();

            audio.attach_transport(RtpTransport::new(MediaType::Audio, receiver.clone()));
            let outputs = VideoOutputPool::new(
                video,
                config.clone(),
                RtpTransport::new(MediaType::Video, receiver),
            );

            Self {
                config,
                audio,
                muxers,
                publisher: PublisherSlot::new(),
                subscribers: SubscriberRegistry::new(),
                outputs,
                local_sinks: RwLock::new(LocalSinks::default()),
                metrics: GatewayMetrics::new(),
                this: this.clone(),
            }
        })
    }

    fn handle(&self) -> Arc<GatewayHandle> {
        Arc::new(GatewayHandle {
            gateway: self.this.clone(),
        })
    }

    /// Attach the publisher feeding this gateway
    ///
    /// Fails if a publisher is already attached or if `source` does not
    /// deliver encoded video frames. Nothing changes on failure.
    pub fn add_publisher(&self, source: Arc<dyn MediaSource>, id: &str) -> Result<()> {
        if source.video_data_type() != DataContentType::EncodedFrame {
            tracing::error!(publisher = id, "Publisher video is not in encoded-frame form");
            return Err(GatewayError::UnsupportedPublisher(id.to_string()));
        }

        let info = PublisherInfo::from_source(id, Arc::clone(&source));
        let format = info.format;
        let audio_ssrc = info.audio_ssrc;
        let video_ssrc = info.video_ssrc;
        let audio_source = AudioSource {
            ssrc: audio_ssrc,
            is_publisher: true,
            data_type: info.audio_data_type,
            payload_type: info.audio_payload_type,
            feedback_sink: info.feedback_sink.clone(),
            id,
        };

        // Pooled outputs outlive publishers; rebinding under the slot lock
        // keeps outputs created concurrently on the same input
        let attached = self
            .publisher
            .attach(info, |info| self.outputs.bind_input(info.format));
        if let Err(e) = attached {
            tracing::warn!(publisher = id, error = %e, "Publisher rejected");
            return Err(e);
        }

        if audio_ssrc != 0 {
            self.audio.add_source(audio_source);
        }

        let handle = self.handle();
        source.set_audio_sink(Some(handle.clone()));
        source.set_video_sink(Some(handle));

        tracing::info!(
            publisher = id,
            format = %format,
            audio_ssrc,
            video_ssrc,
            "Publisher attached"
        );

        Ok(())
    }

    /// Detach the publisher
    ///
    /// Fails unless `id` is the attached publisher and no subscriber
    /// remains. Pooled outputs are kept but stop accepting frames.
    pub fn remove_publisher(&self, id: &str) -> Result<()> {
        let detached = self.publisher.detach(
            id,
            || match self.subscribers.len() {
                0 => Ok(()),
                remaining => Err(GatewayError::SubscribersRemaining(remaining)),
            },
            |_| self.outputs.unset_inputs(),
        );

        match detached {
            Ok(info) => {
                self.release_publisher(info);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(publisher = id, error = %e, "Publisher not removed");
                Err(e)
            }
        }
    }

    fn release_publisher(&self, info: PublisherInfo) {
        self.audio.remove_source(info.audio_ssrc, true);
        info.source.set_audio_sink(None);
        info.source.set_video_sink(None);

        tracing::info!(publisher = %info.id, "Publisher detached");
    }

    /// Ask the publisher for a full intra frame
    pub fn send_fir_packet(&self) -> Result<i32> {
        Ok(self.publisher.source()?.send_fir_packet())
    }

    pub fn set_video_codec(&self, codec_name: &str, clock_rate: u32) -> Result<i32> {
        Ok(self.publisher.source()?.set_video_codec(codec_name, clock_rate))
    }

    pub fn set_audio_codec(&self, codec_name: &str, clock_rate: u32) -> Result<i32> {
        Ok(self.publisher.source()?.set_audio_codec(codec_name, clock_rate))
    }

    /// Attach a subscriber under `id`
    ///
    /// The subscriber shares the video output for its preferred payload
    /// type and gets its own audio channel; the assigned SSRCs are written
    /// back to `sink`. A payload type with no output format leaves the
    /// subscriber audio-only with video SSRC 0.
    pub fn add_subscriber(&self, sink: Arc<dyn MediaSink>, id: &str) -> Result<()> {
        if self.subscribers.contains(id) {
            tracing::warn!(subscriber = id, "Subscriber id already registered");
            return Err(RegistryError::DuplicateSubscriber(id.to_string()).into());
        }

        let (nack, fec) = self
            .config
            .loss_recovery(sink.accepts_retransmission(), sink.accepts_fec());

        let video_payload_type = sink.preferred_video_payload_type();
        let video_ssrc = self.outputs.get_or_create(video_payload_type, nack, fec);
        sink.set_video_sink_ssrc(video_ssrc);

        let audio_channel = self
            .audio
            .add_output(id, sink.preferred_audio_payload_type());
        let audio_ssrc = self.audio.send_ssrc(audio_channel);
        sink.set_audio_sink_ssrc(audio_ssrc);

        let video_output = (video_ssrc != 0).then_some(video_payload_type);
        let entry = SubscriberEntry::new(Arc::clone(&sink), video_output, audio_channel);

        // Lost a race for `id`. The audio engine has no way to release the
        // channel, so only the sink is reset.
        if let Err(e) = self.subscribers.add(id, entry.clone()) {
            sink.set_video_sink_ssrc(0);
            sink.set_audio_sink_ssrc(0);
            tracing::warn!(subscriber = id, audio_channel, "Subscriber id registered concurrently");
            return Err(e.into());
        }
        let wired = entry.wire_feedback(self.handle());

        tracing::debug!(
            subscriber = id,
            video_payload_type,
            video_ssrc,
            audio_ssrc,
            nack,
            fec,
            feedback = wired,
            "Subscriber attached"
        );

        Ok(())
    }

    /// Detach a subscriber; its video output stays pooled
    pub fn remove_subscriber(&self, id: &str) -> Result<()> {
        let entry = self
            .subscribers
            .remove(id)
            .ok_or_else(|| RegistryError::SubscriberNotFound(id.to_string()))?;

        entry.unwire_feedback();

        tracing::debug!(
            subscriber = id,
            video_output = ?entry.video_output,
            audio_channel = entry.audio_channel,
            "Subscriber detached"
        );
        Ok(())
    }

    /// Create a muxer-backed output from a JSON configuration document
    ///
    /// The document's `id` names the output, which then joins as a
    /// subscriber. The muxer reports its progress on `events`.
    pub fn add_external_output(
        &self,
        config: &str,
        events: mpsc::Sender<MuxerEvent>,
    ) -> Result<()> {
        let parsed = ExternalOutputConfig::parse(config)?;
        let id = parsed.id;

        if self.subscribers.contains(&id) {
            tracing::warn!(output = %id, "External output id already in use");
            return Err(GatewayError::DuplicateOutput(id));
        }

        let muxer = self
            .muxers
            .create_muxer(&id, config, events)
            .ok_or_else(|| GatewayError::MuxerUnavailable(id.clone()))?;

        let output = Arc::new(ExternalOutput::new(id.clone(), muxer));
        if let Err(e) = self.add_subscriber(output, &id) {
            self.muxers.recycle_muxer(&id);
            return Err(e);
        }

        tracing::info!(output = %id, "External output added");
        Ok(())
    }

    /// Detach an external output, recycling its muxer if `close` is set
    pub fn remove_external_output(&self, id: &str, close: bool) -> Result<()> {
        if let Err(e) = self.remove_subscriber(id) {
            tracing::debug!(output = id, error = %e, "External output was not subscribed");
        }

        if close && !self.muxers.recycle_muxer(id) {
            return Err(GatewayError::MuxerUnavailable(id.to_string()));
        }

        tracing::info!(output = id, close, "External output removed");
        Ok(())
    }

    /// Install (or clear) the passthrough sink for raw incoming audio
    pub fn set_audio_sink(&self, sink: Option<Arc<dyn MediaSink>>) {
        self.local_sinks.write().audio = sink;
    }

    /// Install (or clear) the passthrough sink for raw incoming video
    pub fn set_video_sink(&self, sink: Option<Arc<dyn MediaSink>>) {
        self.local_sinks.write().video = sink;
    }

    /// Drop every subscriber, then the publisher
    pub fn close_all(&self) {
        let drained = self.subscribers.drain();
        for (_, entry) in &drained {
            entry.unwire_feedback();
        }

        if let Some(info) = self.publisher.take(|_| self.outputs.unset_inputs()) {
            self.release_publisher(info);
        }

        tracing::info!(subscribers = drained.len(), "Gateway closed");
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn has_publisher(&self) -> bool {
        self.publisher.is_attached()
    }

    pub fn publisher_id(&self) -> Option<String> {
        self.publisher.id()
    }

    /// Incoming video format of the attached publisher
    pub fn incoming_video_format(&self) -> FrameFormat {
        self.publisher.format()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn subscriber_ids(&self) -> Vec<String> {
        self.subscribers.ids()
    }

    pub fn video_output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Outbound SSRC of the video output for `payload_type`
    pub fn video_output_ssrc(&self, payload_type: u8) -> Option<u32> {
        self.outputs.ssrc(payload_type)
    }

    pub fn stats(&self) -> GatewayStats {
        GatewayStats {
            subscribers: self.subscribers.len(),
            video_outputs: self.outputs.len(),
            has_publisher: self.publisher.is_attached(),
            ..self.metrics.snapshot()
        }
    }
}

impl MediaSink for InputGateway {
    fn deliver_audio_data(&self, data: Bytes) -> usize {
        if data.is_empty() {
            return 0;
        }
        let len = data.len();

        if let Some(sink) = self.local_sinks.read().audio.as_ref() {
            sink.deliver_audio_data(data.clone());
        }

        if !self.subscribers.is_empty() {
            self.audio.deliver_audio_data(data);
        }

        self.metrics.record_audio(len);
        len
    }

    fn deliver_video_data(&self, data: Bytes) -> usize {
        if data.is_empty() {
            return 0;
        }
        let len = data.len();

        if let Some(sink) = self.local_sinks.read().video.as_ref() {
            sink.deliver_video_data(data.clone());
        }

        if !self.subscribers.is_empty() {
            let frame = Frame::new(self.publisher.format(), data);
            self.outputs.deliver_frame(&frame);
        }

        self.metrics.record_video(len);
        len
    }
}

impl FeedbackSink for InputGateway {
    fn deliver_feedback(&self, data: Bytes) -> usize {
        if data.is_empty() {
            return 0;
        }
        let len = data.len();

        let recipients = FeedbackRouter::new(&self.outputs, self.audio.as_ref()).route(data);
        self.metrics.record_feedback();

        tracing::trace!(len, recipients, "Feedback routed");
        len
    }
}

impl RtpReceiver for InputGateway {
    fn receive_rtp_data(&self, data: Bytes, media: MediaType, _stream_id: u32) {
        if data.is_empty() || self.subscribers.is_empty() {
            return;
        }

        let deliveries = demux::dispatch(&self.subscribers, data, media);
        self.metrics.record_rtp(deliveries);
    }
}

impl Drop for InputGateway {
    fn drop(&mut self) {
        self.close_all();
    }
}

impl std::fmt::Debug for InputGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputGateway")
            .field("publisher", &self.publisher.id())
            .field("subscribers", &self.subscribers.len())
            .field("video_outputs", &self.outputs.len())
            .finish()
    }
}

/// Weak reference to the gateway handed to publishers and subscribers
///
/// Media pushed after the gateway is dropped is discarded.
struct GatewayHandle {
    gateway: Weak<InputGateway>,
}

impl MediaSink for GatewayHandle {
    fn deliver_audio_data(&self, data: Bytes) -> usize {
        self.gateway
            .upgrade()
            .map_or(0, |g| g.deliver_audio_data(data))
    }

    fn deliver_video_data(&self, data: Bytes) -> usize {
        self.gateway
            .upgrade()
            .map_or(0, |g| g.deliver_video_data(data))
    }
}

impl FeedbackSink for GatewayHandle {
    fn deliver_feedback(&self, data: Bytes) -> usize {
        self.gateway
            .upgrade()
            .map_or(0, |g| g.deliver_feedback(data))
    }
}

//! Recording fakes for the gateway's collaborators

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Once};

use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::engine::{
    AudioEngine, AudioSource, ChannelHandle, FrameSender, MediaMuxer, MuxerEvent, MuxerFactory,
    OutputSettings, RtpTransport, SenderSettings, VideoBackend, VideoTranscoder,
};
use crate::media::{
    DataContentType, FeedbackSink, FeedbackSource, Frame, FrameFormat, MediaSink, MediaSource,
    H264_90000_PT, OPUS_48000_PT, VP8_90000_PT,
};

static TRACING: Once = Once::new();

pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// One-shot rendezvous that parks the first caller of [`Gate::pass`]
///
/// The test thread waits for the caller to arrive, acts, then opens the
/// gate to let the caller continue.
pub struct Gate {
    armed: AtomicBool,
    entered: Barrier,
    release: Barrier,
}

impl Gate {
    pub fn new() -> Self {
        Self {
            armed: AtomicBool::new(true),
            entered: Barrier::new(2),
            release: Barrier::new(2),
        }
    }

    /// Park the first caller until [`Gate::open`]; later callers pass through
    pub fn pass(&self) {
        if self.armed.swap(false, Ordering::SeqCst) {
            self.entered.wait();
            self.release.wait();
        }
    }

    pub fn wait_entered(&self) {
        self.entered.wait();
    }

    pub fn open(&self) {
        self.release.wait();
    }
}

/// Build an RTP packet with the given payload type and SSRC
pub fn rtp_packet(payload_type: u8, ssrc: u32) -> Bytes {
    let mut packet = vec![0x80, payload_type, 0x00, 0x2A, 0x00, 0x00, 0x10, 0x00];
    packet.extend_from_slice(&ssrc.to_be_bytes());
    packet.extend_from_slice(&[0x10, 0x20, 0x30]);
    Bytes::from(packet)
}

/// Build an RTCP packet of `packet_type` with the given sender SSRC
pub fn rtcp_packet(packet_type: u8, ssrc: u32) -> Bytes {
    let mut packet = vec![0x80, packet_type, 0x00, 0x06];
    packet.extend_from_slice(&ssrc.to_be_bytes());
    packet.extend_from_slice(&[0; 20]);
    Bytes::from(packet)
}

#[derive(Default)]
pub struct RecordingFeedbackSink {
    pub received: Mutex<Vec<Bytes>>,
}

impl RecordingFeedbackSink {
    pub fn count(&self) -> usize {
        self.received.lock().len()
    }
}

impl FeedbackSink for RecordingFeedbackSink {
    fn deliver_feedback(&self, data: Bytes) -> usize {
        let len = data.len();
        self.received.lock().push(data);
        len
    }
}

#[derive(Default)]
pub struct FakeFeedbackSource {
    pub sink: Mutex<Option<Arc<dyn FeedbackSink>>>,
}

impl FakeFeedbackSource {
    pub fn is_wired(&self) -> bool {
        self.sink.lock().is_some()
    }

    /// Push feedback as the subscriber would
    pub fn emit(&self, data: Bytes) -> usize {
        let sink = self.sink.lock().clone();
        sink.map(|s| s.deliver_feedback(data)).unwrap_or(0)
    }
}

impl FeedbackSource for FakeFeedbackSource {
    fn set_feedback_sink(&self, sink: Option<Arc<dyn FeedbackSink>>) {
        *self.sink.lock() = sink;
    }
}

/// Subscriber or passthrough sink recording everything it receives
pub struct FakeSink {
    pub audio_ssrc: AtomicU32,
    pub video_ssrc: AtomicU32,
    pub video_payload_type: u8,
    pub audio_payload_type: u8,
    pub wants_fec: bool,
    pub audio: Mutex<Vec<Bytes>>,
    pub video: Mutex<Vec<Bytes>>,
    pub feedback: Option<Arc<FakeFeedbackSource>>,
}

impl FakeSink {
    pub fn new(video_payload_type: u8) -> Self {
        Self {
            audio_ssrc: AtomicU32::new(0),
            video_ssrc: AtomicU32::new(0),
            video_payload_type,
            audio_payload_type: OPUS_48000_PT,
            wants_fec: false,
            audio: Mutex::new(Vec::new()),
            video: Mutex::new(Vec::new()),
            feedback: None,
        }
    }

    pub fn vp8() -> Self {
        Self::new(VP8_90000_PT)
    }

    pub fn h264() -> Self {
        Self::new(H264_90000_PT)
    }

    pub fn with_feedback(mut self) -> Self {
        self.feedback = Some(Arc::new(FakeFeedbackSource::default()));
        self
    }

    pub fn with_fec_request(mut self) -> Self {
        self.wants_fec = true;
        self
    }

    pub fn with_ssrcs(self, audio: u32, video: u32) -> Self {
        self.audio_ssrc.store(audio, Ordering::SeqCst);
        self.video_ssrc.store(video, Ordering::SeqCst);
        self
    }

    pub fn audio_count(&self) -> usize {
        self.audio.lock().len()
    }

    pub fn video_count(&self) -> usize {
        self.video.lock().len()
    }
}

impl MediaSink for FakeSink {
    fn deliver_audio_data(&self, data: Bytes) -> usize {
        let len = data.len();
        self.audio.lock().push(data);
        len
    }

    fn deliver_video_data(&self, data: Bytes) -> usize {
        let len = data.len();
        self.video.lock().push(data);
        len
    }

    fn audio_sink_ssrc(&self) -> u32 {
        self.audio_ssrc.load(Ordering::SeqCst)
    }

    fn video_sink_ssrc(&self) -> u32 {
        self.video_ssrc.load(Ordering::SeqCst)
    }

    fn set_audio_sink_ssrc(&self, ssrc: u32) {
        self.audio_ssrc.store(ssrc, Ordering::SeqCst);
    }

    fn set_video_sink_ssrc(&self, ssrc: u32) {
        self.video_ssrc.store(ssrc, Ordering::SeqCst);
    }

    fn preferred_audio_payload_type(&self) -> u8 {
        self.audio_payload_type
    }

    fn preferred_video_payload_type(&self) -> u8 {
        self.video_payload_type
    }

    fn accepts_retransmission(&self) -> bool {
        false
    }

    fn accepts_fec(&self) -> bool {
        self.wants_fec
    }

    fn feedback_source(&self) -> Option<Arc<dyn FeedbackSource>> {
        self.feedback
            .as_ref()
            .map(|f| Arc::clone(f) as Arc<dyn FeedbackSource>)
    }
}

pub struct FakePublisher {
    pub audio_ssrc: u32,
    pub video_ssrc: u32,
    pub video_payload_type: u8,
    pub video_data_type: DataContentType,
    pub feedback: Arc<RecordingFeedbackSink>,
    pub audio_sink: Mutex<Option<Arc<dyn MediaSink>>>,
    pub video_sink: Mutex<Option<Arc<dyn MediaSink>>>,
    pub fir_requests: AtomicUsize,
    pub video_codec: Mutex<Option<(String, u32)>>,
    pub audio_codec: Mutex<Option<(String, u32)>>,
}

impl FakePublisher {
    pub fn new(video_payload_type: u8, video_ssrc: u32, audio_ssrc: u32) -> Self {
        Self {
            audio_ssrc,
            video_ssrc,
            video_payload_type,
            video_data_type: DataContentType::EncodedFrame,
            feedback: Arc::new(RecordingFeedbackSink::default()),
            audio_sink: Mutex::new(None),
            video_sink: Mutex::new(None),
            fir_requests: AtomicUsize::new(0),
            video_codec: Mutex::new(None),
            audio_codec: Mutex::new(None),
        }
    }

    pub fn vp8() -> Self {
        Self::new(VP8_90000_PT, 1001, 2001)
    }

    pub fn raw_rtp(mut self) -> Self {
        self.video_data_type = DataContentType::Rtp;
        self
    }

    pub fn has_sinks(&self) -> bool {
        self.audio_sink.lock().is_some() && self.video_sink.lock().is_some()
    }

    /// Push a video buffer the way the real source would
    pub fn push_video(&self, data: Bytes) -> usize {
        let sink = self.video_sink.lock().clone();
        sink.map(|s| s.deliver_video_data(data)).unwrap_or(0)
    }
}

impl MediaSource for FakePublisher {
    fn audio_source_ssrc(&self) -> u32 {
        self.audio_ssrc
    }

    fn video_source_ssrc(&self) -> u32 {
        self.video_ssrc
    }

    fn audio_data_type(&self) -> DataContentType {
        DataContentType::Rtp
    }

    fn video_data_type(&self) -> DataContentType {
        self.video_data_type
    }

    fn audio_payload_type(&self) -> u8 {
        OPUS_48000_PT
    }

    fn video_payload_type(&self) -> u8 {
        self.video_payload_type
    }

    fn feedback_sink(&self) -> Option<Arc<dyn FeedbackSink>> {
        Some(Arc::clone(&self.feedback) as Arc<dyn FeedbackSink>)
    }

    fn set_audio_sink(&self, sink: Option<Arc<dyn MediaSink>>) {
        *self.audio_sink.lock() = sink;
    }

    fn set_video_sink(&self, sink: Option<Arc<dyn MediaSink>>) {
        *self.video_sink.lock() = sink;
    }

    fn send_fir_packet(&self) -> i32 {
        self.fir_requests.fetch_add(1, Ordering::SeqCst);
        0
    }

    fn set_video_codec(&self, codec_name: &str, clock_rate: u32) -> i32 {
        *self.video_codec.lock() = Some((codec_name.to_string(), clock_rate));
        0
    }

    fn set_audio_codec(&self, codec_name: &str, clock_rate: u32) -> i32 {
        *self.audio_codec.lock() = Some((codec_name.to_string(), clock_rate));
        0
    }
}

#[derive(Default)]
pub struct FakeAudioEngine {
    pub sources: Mutex<Vec<(u32, bool, String)>>,
    pub outputs: Mutex<Vec<(String, u8)>>,
    pub audio: Mutex<Vec<Bytes>>,
    pub feedback: Mutex<Vec<Bytes>>,
    pub transport: Mutex<Option<RtpTransport>>,
    next_channel: AtomicI32,
    gate: Option<Arc<Gate>>,
}

impl FakeAudioEngine {
    pub const SSRC_BASE: u32 = 3000;

    /// Engine whose first `add_output` waits on `gate`
    pub fn gated(gate: Arc<Gate>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn audio_count(&self) -> usize {
        self.audio.lock().len()
    }

    pub fn feedback_count(&self) -> usize {
        self.feedback.lock().len()
    }
}

impl AudioEngine for FakeAudioEngine {
    fn attach_transport(&self, transport: RtpTransport) {
        *self.transport.lock() = Some(transport);
    }

    fn add_source(&self, source: AudioSource<'_>) -> bool {
        self.sources
            .lock()
            .push((source.ssrc, source.is_publisher, source.id.to_string()));
        true
    }

    fn remove_source(&self, ssrc: u32, is_publisher: bool) -> bool {
        let mut sources = self.sources.lock();
        let before = sources.len();
        sources.retain(|(s, p, _)| !(*s == ssrc && *p == is_publisher));
        sources.len() != before
    }

    fn add_output(&self, id: &str, payload_type: u8) -> ChannelHandle {
        if let Some(gate) = &self.gate {
            gate.pass();
        }
        self.outputs.lock().push((id.to_string(), payload_type));
        self.next_channel.fetch_add(1, Ordering::SeqCst)
    }

    fn send_ssrc(&self, channel: ChannelHandle) -> u32 {
        Self::SSRC_BASE + channel as u32
    }

    fn deliver_audio_data(&self, data: Bytes) -> usize {
        let len = data.len();
        self.audio.lock().push(data);
        len
    }

    fn deliver_feedback(&self, data: Bytes) -> usize {
        let len = data.len();
        self.feedback.lock().push(data);
        len
    }
}

#[derive(Default)]
pub struct FakeTranscoder {
    pub input: Mutex<Option<FrameFormat>>,
    pub outputs: Mutex<Vec<OutputSettings>>,
    pub frames: Mutex<Vec<Frame>>,
    pub dropped: AtomicUsize,
}

impl FakeTranscoder {
    pub fn frame_count(&self) -> usize {
        self.frames.lock().len()
    }

    pub fn input_format(&self) -> Option<FrameFormat> {
        *self.input.lock()
    }
}

impl VideoTranscoder for FakeTranscoder {
    fn set_input(&self, format: FrameFormat, _source: Option<Arc<dyn MediaSource>>) -> bool {
        *self.input.lock() = Some(format);
        true
    }

    fn unset_input(&self) {
        *self.input.lock() = None;
    }

    fn activate_output(&self, settings: OutputSettings, _sender: Arc<dyn FrameSender>) -> bool {
        self.outputs.lock().push(settings);
        true
    }

    fn on_frame(&self, frame: Frame) {
        if self.input.lock().is_some() {
            self.frames.lock().push(frame);
        } else {
            self.dropped.fetch_add(1, Ordering::SeqCst);
        }
    }
}

pub struct FakeSender {
    pub settings: SenderSettings,
    pub ssrc: u32,
    pub codec: Mutex<Option<(FrameFormat, u32, u32)>>,
    pub sending: Mutex<Option<(bool, bool)>>,
    pub start_calls: AtomicUsize,
    pub feedback: Arc<RecordingFeedbackSink>,
    pub transport: RtpTransport,
}

impl FakeSender {
    /// Emit one RTP packet on this sender's SSRC
    pub fn emit(&self, payload_type: u8) -> usize {
        self.transport.send_packet(rtp_packet(payload_type, self.ssrc))
    }
}

impl FrameSender for FakeSender {
    fn set_send_codec(&self, format: FrameFormat, width: u32, height: u32) -> bool {
        *self.codec.lock() = Some((format, width, height));
        true
    }

    fn start_send(&self, nack: bool, fec: bool) {
        *self.sending.lock() = Some((nack, fec));
        self.start_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn send_ssrc(&self, _nack: bool, _fec: bool) -> u32 {
        self.ssrc
    }

    fn feedback_sink(&self) -> Option<Arc<dyn FeedbackSink>> {
        Some(Arc::clone(&self.feedback) as Arc<dyn FeedbackSink>)
    }
}

#[derive(Default)]
pub struct FakeVideoBackend {
    pub transcoders: Mutex<Vec<Arc<FakeTranscoder>>>,
    pub senders: Mutex<Vec<Arc<FakeSender>>>,
    next_ssrc: AtomicU32,
    gate: Option<Arc<Gate>>,
}

impl FakeVideoBackend {
    pub const SSRC_BASE: u32 = 5000;

    /// Backend whose first `create_transcoder` waits on `gate`
    pub fn gated(gate: Arc<Gate>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn transcoder(&self, index: usize) -> Arc<FakeTranscoder> {
        Arc::clone(&self.transcoders.lock()[index])
    }

    pub fn sender(&self, index: usize) -> Arc<FakeSender> {
        Arc::clone(&self.senders.lock()[index])
    }

    pub fn sender_count(&self) -> usize {
        self.senders.lock().len()
    }
}

impl VideoBackend for FakeVideoBackend {
    fn create_transcoder(&self) -> Arc<dyn VideoTranscoder> {
        if let Some(gate) = &self.gate {
            gate.pass();
        }
        let transcoder = Arc::new(FakeTranscoder::default());
        self.transcoders.lock().push(Arc::clone(&transcoder));
        transcoder
    }

    fn create_sender(
        &self,
        settings: SenderSettings,
        _transcoder: &Arc<dyn VideoTranscoder>,
        transport: RtpTransport,
    ) -> Arc<dyn FrameSender> {
        let ssrc = Self::SSRC_BASE + self.next_ssrc.fetch_add(1, Ordering::SeqCst);
        let sender = Arc::new(FakeSender {
            settings,
            ssrc,
            codec: Mutex::new(None),
            sending: Mutex::new(None),
            start_calls: AtomicUsize::new(0),
            feedback: Arc::new(RecordingFeedbackSink::default()),
            transport,
        });
        self.senders.lock().push(Arc::clone(&sender));
        sender
    }
}

pub struct FakeMuxer {
    pub video_payload_type: u8,
    pub audio: Mutex<Vec<Bytes>>,
    pub video: Mutex<Vec<Bytes>>,
}

impl FakeMuxer {
    pub fn new(video_payload_type: u8) -> Self {
        Self {
            video_payload_type,
            audio: Mutex::new(Vec::new()),
            video: Mutex::new(Vec::new()),
        }
    }
}

impl MediaMuxer for FakeMuxer {
    fn on_audio_packet(&self, data: Bytes) -> usize {
        let len = data.len();
        self.audio.lock().push(data);
        len
    }

    fn on_video_packet(&self, data: Bytes) -> usize {
        let len = data.len();
        self.video.lock().push(data);
        len
    }

    fn audio_payload_type(&self) -> u8 {
        OPUS_48000_PT
    }

    fn video_payload_type(&self) -> u8 {
        self.video_payload_type
    }
}

#[derive(Default)]
pub struct FakeMuxerFactory {
    pub muxers: Mutex<Vec<(String, Arc<FakeMuxer>)>>,
    pub recycled: Mutex<Vec<String>>,
    pub refuse: AtomicBool,
}

impl FakeMuxerFactory {
    pub fn muxer(&self, id: &str) -> Option<Arc<FakeMuxer>> {
        self.muxers
            .lock()
            .iter()
            .find(|(muxer_id, _)| muxer_id == id)
            .map(|(_, m)| Arc::clone(m))
    }
}

impl MuxerFactory for FakeMuxerFactory {
    fn create_muxer(
        &self,
        id: &str,
        _config: &str,
        events: mpsc::Sender<MuxerEvent>,
    ) -> Option<Arc<dyn MediaMuxer>> {
        if self.refuse.load(Ordering::SeqCst) {
            let _ = events.try_send(MuxerEvent::Error {
                id: id.to_string(),
                message: "refused".to_string(),
            });
            return None;
        }

        let muxer = Arc::new(FakeMuxer::new(H264_90000_PT));
        self.muxers.lock().push((id.to_string(), Arc::clone(&muxer)));
        let _ = events.try_send(MuxerEvent::Started { id: id.to_string() });
        Some(muxer)
    }

    fn recycle_muxer(&self, id: &str) -> bool {
        let mut muxers = self.muxers.lock();
        let before = muxers.len();
        muxers.retain(|(muxer_id, _)| muxer_id != id);
        let removed = muxers.len() != before;
        if removed {
            self.recycled.lock().push(id.to_string());
        }
        removed
    }
}

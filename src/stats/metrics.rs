//! Statistics and metrics for the input gateway

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;

/// Live counters updated on the media path
///
/// Counters are relaxed atomics; a snapshot is not a consistent cut across
/// counters.
#[derive(Debug)]
pub struct GatewayMetrics {
    started_at: Instant,
    audio_frames: AtomicU64,
    audio_bytes: AtomicU64,
    video_frames: AtomicU64,
    video_bytes: AtomicU64,
    feedback_routed: AtomicU64,
    rtp_delivered: AtomicU64,
    rtp_dropped: AtomicU64,
}

impl Default for GatewayMetrics {
    fn default() -> Self {
        Self {
            started_at: Instant::now(),
            audio_frames: AtomicU64::new(0),
            audio_bytes: AtomicU64::new(0),
            video_frames: AtomicU64::new(0),
            video_bytes: AtomicU64::new(0),
            feedback_routed: AtomicU64::new(0),
            rtp_delivered: AtomicU64::new(0),
            rtp_dropped: AtomicU64::new(0),
        }
    }
}

impl GatewayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_audio(&self, len: usize) {
        self.audio_frames.fetch_add(1, Ordering::Relaxed);
        self.audio_bytes.fetch_add(len as u64, Ordering::Relaxed);
    }

    pub fn record_video(&self, len: usize) {
        self.video_frames.fetch_add(1, Ordering::Relaxed);
        self.video_bytes.fetch_add(len as u64, Ordering::Relaxed);
    }

    pub fn record_feedback(&self) {
        self.feedback_routed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of demultiplexing one packet
    pub fn record_rtp(&self, deliveries: usize) {
        if deliveries == 0 {
            self.rtp_dropped.fetch_add(1, Ordering::Relaxed);
        } else {
            self.rtp_delivered
                .fetch_add(deliveries as u64, Ordering::Relaxed);
        }
    }

    /// Snapshot the counters
    ///
    /// Topology fields are left at their defaults for the caller to fill.
    pub fn snapshot(&self) -> GatewayStats {
        GatewayStats {
            uptime: self.started_at.elapsed(),
            audio_frames: self.audio_frames.load(Ordering::Relaxed),
            audio_bytes: self.audio_bytes.load(Ordering::Relaxed),
            video_frames: self.video_frames.load(Ordering::Relaxed),
            video_bytes: self.video_bytes.load(Ordering::Relaxed),
            feedback_routed: self.feedback_routed.load(Ordering::Relaxed),
            rtp_delivered: self.rtp_delivered.load(Ordering::Relaxed),
            rtp_dropped: self.rtp_dropped.load(Ordering::Relaxed),
            ..GatewayStats::default()
        }
    }
}

/// Point-in-time gateway statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GatewayStats {
    /// Time since the gateway was created
    pub uptime: Duration,
    /// Audio buffers accepted from the publisher
    pub audio_frames: u64,
    pub audio_bytes: u64,
    /// Video frames accepted from the publisher
    pub video_frames: u64,
    pub video_bytes: u64,
    /// Feedback buffers routed to the output paths
    pub feedback_routed: u64,
    /// Packet deliveries made to subscribers by SSRC
    pub rtp_delivered: u64,
    /// Packets that matched no subscriber
    pub rtp_dropped: u64,
    /// Registered subscribers
    pub subscribers: usize,
    /// Pooled video outputs
    pub video_outputs: usize,
    /// Whether a publisher is attached
    pub has_publisher: bool,
}

impl GatewayStats {
    /// Average inbound video bitrate in bits per second
    pub fn video_bitrate(&self) -> u64 {
        let secs = self.uptime.as_secs();
        if secs > 0 {
            (self.video_bytes * 8) / secs
        } else {
            0
        }
    }
}

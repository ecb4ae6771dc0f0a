//! media-gateway: the media-routing core of a conferencing bridge
//!
//! An [`InputGateway`] accepts encoded audio/video from one publisher and
//! redistributes it to a changing set of subscribers:
//!
//! - Publisher media is fanned into the audio engine and into one pooled
//!   transcoder + sender pipeline per outbound video payload type
//! - Packets produced by those pipelines loop back through
//!   [`RtpReceiver::receive_rtp_data`] and are delivered to subscribers by SSRC
//! - Feedback from subscribers is fanned out to every sender and to the
//!   audio engine
//! - Muxer-backed external outputs join as ordinary subscribers
//!
//! The audio engine, the video backend and the muxer factory are external
//! collaborators described by the traits in [`engine`].
//!
//! # Threading
//!
//! Every operation takes `&self` and is safe to call concurrently, with one
//! exception: frames of one publisher must be delivered from a single
//! thread.

pub mod engine;
pub mod error;
pub mod gateway;
pub mod media;
pub mod output;
pub mod registry;
pub mod routing;
pub mod stats;

#[cfg(test)]
mod test_utils;

pub use engine::{
    AudioEngine, FrameSender, MediaMuxer, MuxerEvent, MuxerFactory, RtpReceiver, RtpTransport,
    VideoBackend, VideoTranscoder,
};
pub use error::{GatewayError, Result};
pub use gateway::{GatewayConfig, InputGateway};
pub use media::{FeedbackSink, FeedbackSource, FrameFormat, MediaSink, MediaSource, MediaType};
pub use output::{ExternalOutput, VideoOutputPool};
pub use registry::{RegistryError, SubscriberRegistry};
pub use stats::GatewayStats;

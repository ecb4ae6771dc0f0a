//! External collaborators consumed by the gateway
//!
//! The audio mixing engine, the video transcoder/sender pair and the muxer
//! factory live outside this crate. The gateway only depends on the traits
//! defined here, so hosts plug in their own implementations and tests plug
//! in recording fakes.
//!
//! # Data path
//!
//! ```text
//!   publisher ──► InputGateway ──► AudioEngine ──┐
//!                      │                         │ RtpTransport(audio)
//!                      └──► VideoTranscoder      │
//!                               │                │
//!                               ▼                ▼
//!                          FrameSender ──► RtpTransport(video)
//!                                                │
//!                     InputGateway::receive_rtp_data ◄┘
//!                               │
//!                               ▼
//!                      subscribers (by SSRC)
//! ```

pub mod audio;
pub mod muxer;
pub mod transport;
pub mod video;

pub use audio::{AudioEngine, AudioSource, ChannelHandle};
pub use muxer::{MediaMuxer, MuxerEvent, MuxerFactory};
pub use transport::{RtpReceiver, RtpTransport};
pub use video::{FrameSender, OutputSettings, SenderSettings, VideoBackend, VideoTranscoder};

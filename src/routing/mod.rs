//! Packet and feedback routing
//!
//! - [`demux`]: delivers outbound RTP/RTCP packets to subscribers by SSRC
//! - [`feedback`]: fans control-plane feedback out to every output path

pub mod demux;
pub mod feedback;

pub use feedback::FeedbackRouter;

//! Gateway configuration

use serde::{Deserialize, Serialize};

/// Default sender target width
pub const DEFAULT_TARGET_WIDTH: u32 = 1280;
/// Default sender target height
pub const DEFAULT_TARGET_HEIGHT: u32 = 720;
/// Default transcoder output frame rate
pub const DEFAULT_FRAME_RATE: u32 = 30;
/// Default transcoder output bitrate (kbps)
pub const DEFAULT_TRANSCODER_KBPS: u32 = 500;

/// Gateway configuration options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// NACK policy for every subscriber: `Some(v)` pins it, `None` honours
    /// what the subscriber asks for
    pub nack_override: Option<bool>,

    /// FEC policy for every subscriber, same semantics as `nack_override`
    pub fec_override: Option<bool>,

    /// Resolution the frame senders are configured for
    pub target_width: u32,
    pub target_height: u32,

    /// Frame rate requested from each transcoder output
    pub transcoder_frame_rate: u32,

    /// Bitrate requested from each transcoder output (kbps)
    pub transcoder_bitrate_kbps: u32,

    /// Target bitrate handed to each frame sender (0 = sender decides)
    pub video_output_kbps: u32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            // Shared outputs carry one loss-recovery scheme for all subscribers
            nack_override: Some(true),
            fec_override: Some(false),
            target_width: DEFAULT_TARGET_WIDTH,
            target_height: DEFAULT_TARGET_HEIGHT,
            transcoder_frame_rate: DEFAULT_FRAME_RATE,
            transcoder_bitrate_kbps: DEFAULT_TRANSCODER_KBPS,
            video_output_kbps: 0,
        }
    }
}

impl GatewayConfig {
    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Pin (or release, with `None`) the NACK policy
    pub fn nack_override(mut self, nack: Option<bool>) -> Self {
        self.nack_override = nack;
        self
    }

    /// Pin (or release, with `None`) the FEC policy
    pub fn fec_override(mut self, fec: Option<bool>) -> Self {
        self.fec_override = fec;
        self
    }

    /// Set the sender target resolution
    pub fn target_resolution(mut self, width: u32, height: u32) -> Self {
        self.target_width = width;
        self.target_height = height;
        self
    }

    /// Set the transcoder output frame rate and bitrate
    pub fn transcoder_output(mut self, frame_rate: u32, bitrate_kbps: u32) -> Self {
        self.transcoder_frame_rate = frame_rate;
        self.transcoder_bitrate_kbps = bitrate_kbps;
        self
    }

    /// Set the frame sender target bitrate
    pub fn video_output_kbps(mut self, kbps: u32) -> Self {
        self.video_output_kbps = kbps;
        self
    }

    /// Resolve the loss-recovery flags for a subscriber's request
    pub fn loss_recovery(&self, wants_nack: bool, wants_fec: bool) -> (bool, bool) {
        (
            self.nack_override.unwrap_or(wants_nack),
            self.fec_override.unwrap_or(wants_fec),
        )
    }
}

//! Error types for gateway operations
//!
//! Every recoverable failure leaves the gateway's prior state untouched.

use thiserror::Error;

use crate::registry::RegistryError;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Error type for gateway operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// A publisher is already attached
    #[error("publisher already attached: {current} (rejected {rejected})")]
    PublisherAlreadyAttached { current: String, rejected: String },

    /// The candidate publisher does not deliver encoded frames
    #[error("publisher {0} does not deliver encoded video frames")]
    UnsupportedPublisher(String),

    /// Publisher id does not match the attached publisher
    #[error("publisher id mismatch: attached {expected:?}, requested {actual}")]
    PublisherMismatch {
        expected: Option<String>,
        actual: String,
    },

    /// No publisher is attached
    #[error("no publisher attached")]
    NoPublisher,

    /// Publisher cannot be detached while subscribers remain
    #[error("{0} subscriber(s) still attached")]
    SubscribersRemaining(usize),

    /// External output configuration document is unusable
    #[error("invalid external output config: {0}")]
    InvalidOutputConfig(String),

    /// An external output (or subscriber) already uses this id
    #[error("external output id already in use: {0}")]
    DuplicateOutput(String),

    /// Muxer factory refused to create a muxer
    #[error("muxer unavailable for output {0}")]
    MuxerUnavailable(String),

    /// Subscriber registry error
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

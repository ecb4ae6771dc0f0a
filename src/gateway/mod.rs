//! Input gateway
//!
//! The orchestrator composing the publisher slot, the subscriber registry,
//! the video output pool and the routing functions.
//!
//! # Lifecycle
//!
//! ```text
//!   add_publisher ──► add_subscriber* ──► deliver_*_data / deliver_feedback
//!                                               │
//!   remove_publisher ◄── remove_subscriber* ◄───┘
//!
//!   close_all (or drop): drain subscribers, then detach the publisher
//! ```
//!
//! The publisher can only be removed once every subscriber is gone. Video
//! outputs are pooled and survive both.

pub mod config;
pub mod input;
pub mod publisher;

pub use config::GatewayConfig;
pub use input::InputGateway;
pub use publisher::{PublisherInfo, PublisherSlot};

//! Gateway statistics

pub mod metrics;

pub use metrics::{GatewayMetrics, GatewayStats};

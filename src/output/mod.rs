//! Outputs fed by the gateway
//!
//! - [`VideoOutputPool`]: one transcoder + sender pipeline per outbound video
//!   payload type, shared by all subscribers asking for that payload type
//! - [`ExternalOutput`]: a muxer attached as a subscriber

pub mod external;
pub mod pipeline;
pub mod pool;

pub use external::{ExternalOutput, ExternalOutputConfig};
pub use pipeline::VideoOutputPipeline;
pub use pool::VideoOutputPool;

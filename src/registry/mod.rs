//! Subscriber registry
//!
//! The registry holds every subscriber attached to the gateway, keyed by its
//! caller-supplied id. Frame and packet fan-out walk the registry under a
//! shared lock; attach/detach take the exclusive lock.
//!
//! # Architecture
//!
//! ```text
//!                     SubscriberRegistry
//!                ┌──────────────────────────┐
//!                │ subscribers: BTreeMap<id,│
//!                │   SubscriberEntry {      │
//!                │     sink,                │
//!                │     video_output: PT,    │──► VideoOutputPool[PT]
//!                │     audio_channel,       │──► AudioEngine channel
//!                │   }                      │
//!                │ >                        │
//!                └──────────────────────────┘
//! ```
//!
//! Subscribers reference their shared video output by payload type, never
//! by an owning handle: outputs live as long as the gateway.

pub mod entry;
pub mod error;
pub mod store;

pub use entry::SubscriberEntry;
pub use error::RegistryError;
pub use store::SubscriberRegistry;

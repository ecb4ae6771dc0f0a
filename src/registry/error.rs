//! Registry error types
//!
//! Error types for subscriber registry operations.

use thiserror::Error;

/// Error type for registry operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A subscriber with this id is already registered
    #[error("subscriber already registered: {0}")]
    DuplicateSubscriber(String),
    /// No subscriber with this id
    #[error("subscriber not found: {0}")]
    SubscriberNotFound(String),
}

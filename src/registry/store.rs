//! Subscriber registry implementation
//!
//! Maps subscriber ids to their sinks. Topology changes (`add`, `remove`,
//! `find`, `drain`) take the exclusive lock; fan-out (`for_each`) takes the
//! shared lock so concurrent fan-outs proceed in parallel with each other.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::entry::SubscriberEntry;
use super::error::RegistryError;
use crate::media::MediaSink;

/// Concurrency-safe mapping of subscriber id to sink
#[derive(Default)]
pub struct SubscriberRegistry {
    subscribers: RwLock<BTreeMap<String, SubscriberEntry>>,
}

impl SubscriberRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber
    ///
    /// Ids are unique: registering an id twice is rejected and the existing
    /// entry is kept.
    pub fn add(&self, id: &str, entry: SubscriberEntry) -> Result<(), RegistryError> {
        let mut subscribers = self.subscribers.write();

        if subscribers.contains_key(id) {
            return Err(RegistryError::DuplicateSubscriber(id.to_string()));
        }

        subscribers.insert(id.to_string(), entry);

        tracing::debug!(
            subscriber = id,
            subscribers = subscribers.len(),
            "Subscriber registered"
        );

        Ok(())
    }

    /// Remove a subscriber, returning its entry
    pub fn remove(&self, id: &str) -> Option<SubscriberEntry> {
        let mut subscribers = self.subscribers.write();
        let removed = subscribers.remove(id);

        if removed.is_some() {
            tracing::debug!(
                subscriber = id,
                subscribers = subscribers.len(),
                "Subscriber unregistered"
            );
        }

        removed
    }

    /// Look up a subscriber's sink
    pub fn find(&self, id: &str) -> Option<Arc<dyn MediaSink>> {
        self.subscribers
            .write()
            .get(id)
            .map(|entry| Arc::clone(&entry.sink))
    }

    /// Check if a subscriber id is registered
    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Visit every subscriber under the shared lock
    ///
    /// `f` must not call back into the registry's exclusive operations.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&str, &SubscriberEntry),
    {
        let subscribers = self.subscribers.read();
        for (id, entry) in subscribers.iter() {
            f(id, entry);
        }
    }

    /// Remove every subscriber, returning the drained entries
    pub fn drain(&self) -> Vec<(String, SubscriberEntry)> {
        let mut subscribers = self.subscribers.write();
        std::mem::take(&mut *subscribers).into_iter().collect()
    }

    /// Get the number of subscribers
    pub fn len(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Check if there are no subscribers
    pub fn is_empty(&self) -> bool {
        self.subscribers.read().is_empty()
    }

    /// Snapshot of the registered ids, in id order
    pub fn ids(&self) -> Vec<String> {
        self.subscribers.read().keys().cloned().collect()
    }
}

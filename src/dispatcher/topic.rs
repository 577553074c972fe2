//! Topic management
//!
//! A `Topic` holds the ordered subscriber registry for one newsletter. Each
//! entry is keyed by the subscriber's identity; registering an identity that is
//! already present replaces the entry in place, so delivery order stays the
//! order of first registration.
//!
//! Concurrency note: callers must synchronize access to `Topic` (the dispatcher
//! owns it, and `SharedDispatcher` puts the dispatcher behind a lock).

use std::fmt;
use std::sync::Arc;

use crate::subscriber::{Receive, SubscriberId};

pub struct Topic {
    pub name: String,
    subscribers: Vec<Arc<dyn Receive>>,
}

impl Topic {
    /// Create a new topic with the given name and no subscribers.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            subscribers: Vec::new(),
        }
    }

    /// Add a subscriber. Returns `false` when the identity was already present
    /// and its entry got overwritten.
    pub fn subscribe(&mut self, subscriber: Arc<dyn Receive>) -> bool {
        match self.position(subscriber.id()) {
            Some(idx) => {
                self.subscribers[idx] = subscriber;
                false
            }
            None => {
                self.subscribers.push(subscriber);
                true
            }
        }
    }

    /// Remove a subscriber. Returns whether it was present.
    pub fn unsubscribe(&mut self, id: &SubscriberId) -> bool {
        match self.position(id) {
            Some(idx) => {
                self.subscribers.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Whether `id` is registered on this topic.
    pub fn contains(&self, id: &SubscriberId) -> bool {
        self.position(id).is_some()
    }

    /// Number of registered subscribers.
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// True when nobody is registered.
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Subscribers in delivery order.
    pub fn subscribers(&self) -> &[Arc<dyn Receive>] {
        &self.subscribers
    }

    /// Read-only copy of the registry.
    pub fn snapshot(&self) -> Subscriptions {
        Subscriptions {
            entries: self.subscribers.clone(),
        }
    }

    fn position(&self, id: &SubscriberId) -> Option<usize> {
        self.subscribers.iter().position(|s| s.id() == id)
    }
}

impl fmt::Debug for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Topic")
            .field("name", &self.name)
            .field("subscribers", &ids(&self.subscribers))
            .finish()
    }
}

/// Snapshot of one topic's registry, in registration order.
///
/// Later changes to the dispatcher are not reflected here.
#[derive(Clone, Default)]
pub struct Subscriptions {
    entries: Vec<Arc<dyn Receive>>,
}

impl Subscriptions {
    /// Whether `id` was registered when the snapshot was taken.
    pub fn contains(&self, id: &SubscriberId) -> bool {
        self.get(id).is_some()
    }

    /// The receive capability registered under `id`.
    pub fn get(&self, id: &SubscriberId) -> Option<&Arc<dyn Receive>> {
        self.entries.iter().find(|s| s.id() == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Subscriber identities in registration order.
    pub fn ids(&self) -> Vec<SubscriberId> {
        ids(&self.entries)
    }

    /// Display names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|s| s.name()).collect()
    }

    /// Iterate over the registered receive capabilities in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Receive>> {
        self.entries.iter()
    }
}

impl fmt::Debug for Subscriptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(ids(&self.entries)).finish()
    }
}

fn ids(subscribers: &[Arc<dyn Receive>]) -> Vec<SubscriberId> {
    subscribers.iter().map(|s| s.id().clone()).collect()
}

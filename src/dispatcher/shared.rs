//! Thread-safe dispatcher handle.
//!
//! One `RwLock` guards the whole registry. Mutations take the write lock, so
//! creating a newsletter is serialized against dispatch on it. `dispatch` only
//! holds the read lock while it copies the topic's subscribers; the receive
//! calls run unlocked, so a slow subscriber does not stall registration and a
//! subscriber may call back into the handle from `receive`.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::dispatcher::engine::{DispatchReport, Dispatcher, deliver};
use crate::dispatcher::message::Message;
use crate::dispatcher::topic::Subscriptions;
use crate::subscriber::{Receive, SubscriberId};
use crate::utils::error::DispatchError;

#[derive(Debug, Clone, Default)]
pub struct SharedDispatcher {
    inner: Arc<RwLock<Dispatcher>>,
}

impl SharedDispatcher {
    /// Create a handle over a new dispatcher with the given newsletters.
    pub fn new<I, S>(newsletters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_dispatcher(Dispatcher::new(newsletters))
    }

    /// Share an existing dispatcher, keeping its topics and registrations.
    pub fn from_dispatcher(dispatcher: Dispatcher) -> Self {
        Self {
            inner: Arc::new(RwLock::new(dispatcher)),
        }
    }

    /// Create a newsletter. Existing newsletters are left untouched; returns
    /// `true` only if one was created.
    pub fn add_newsletter(&self, name: impl Into<String>) -> bool {
        self.inner.write().add_newsletter(name)
    }

    /// Whether `name` has been created.
    pub fn has_newsletter(&self, name: &str) -> bool {
        self.inner.read().has_newsletter(name)
    }

    /// Names of all newsletters, sorted.
    pub fn newsletters(&self) -> Vec<String> {
        self.inner.read().newsletters()
    }

    /// Register `subscriber` on `newsletter`, keyed by its identity.
    /// Fails with `TopicNotFound` if the newsletter was never created.
    pub fn register(
        &self,
        newsletter: &str,
        subscriber: Arc<dyn Receive>,
    ) -> Result<(), DispatchError> {
        self.inner.write().register(newsletter, subscriber)
    }

    /// Remove `subscriber` from `newsletter`. Returns whether an entry was
    /// removed; a missing subscriber is not an error.
    pub fn unregister(
        &self,
        newsletter: &str,
        subscriber: &SubscriberId,
    ) -> Result<bool, DispatchError> {
        self.inner.write().unregister(newsletter, subscriber)
    }

    /// Snapshot of the subscribers registered on `newsletter`.
    pub fn get_subscriptions(&self, newsletter: &str) -> Result<Subscriptions, DispatchError> {
        self.inner.read().get_subscriptions(newsletter)
    }

    /// Unregister `subscriber` from every newsletter. Returns how many
    /// registrations were removed.
    pub fn cleanup_subscriber(&self, subscriber: &SubscriberId) -> usize {
        self.inner.write().cleanup_subscriber(subscriber)
    }

    /// Same contract as [`Dispatcher::dispatch`], delivering to the subscribers
    /// registered at the moment of the call.
    pub fn dispatch(
        &self,
        newsletter: &str,
        payload: impl Into<String>,
    ) -> Result<DispatchReport, DispatchError> {
        let subscribers = {
            let guard = self.inner.read();
            guard.topic(newsletter)?.subscribers().to_vec()
        };
        let message = Message::new(newsletter, payload);
        Ok(deliver(&message, &subscribers))
    }
}

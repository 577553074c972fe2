//! Dispatcher engine
//!
//! This module contains the in-memory dispatcher responsible for:
//! - creating newsletters (topics) and tracking their subscriber registries
//! - registering and unregistering subscribers per topic
//! - fanning a message out to every subscriber of a topic, synchronously and in
//!   registration order
//!
//! Any operation that names a topic which was never created fails with
//! `DispatchError::TopicNotFound`. A subscriber that fails while receiving is
//! logged and recorded in the returned `DispatchReport`; the remaining
//! subscribers still get the message.
//!
//! The API takes `&mut self` for mutation. For use across threads wrap it in
//! `SharedDispatcher`, which does not hold its lock while subscribers run.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::dispatcher::message::Message;
use crate::dispatcher::topic::{Subscriptions, Topic};
use crate::subscriber::{Receive, SubscriberId};
use crate::utils::error::{DeliveryFailure, DispatchError};

/// Outcome of a single `dispatch` call.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Subscribers whose `receive` returned `Ok`.
    pub delivered: usize,
    /// Subscribers whose `receive` failed, in delivery order.
    pub failures: Vec<DeliveryFailure>,
}

impl DispatchReport {
    /// Number of subscribers the message was offered to.
    pub fn attempted(&self) -> usize {
        self.delivered + self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Owns every newsletter and its subscriber registry.
///
/// Subscribers hold no reference back to the dispatcher; pass the dispatcher
/// (or a `SharedDispatcher`) explicitly to whoever needs it.
#[derive(Debug, Default)]
pub struct Dispatcher {
    topics: HashMap<String, Topic>,
}

impl Dispatcher {
    /// Create a dispatcher with the given newsletters, each with no subscribers.
    pub fn new<I, S>(newsletters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut dispatcher = Self::default();
        for name in newsletters {
            dispatcher.add_newsletter(name);
        }
        dispatcher
    }

    /// Create a newsletter with an empty registry.
    ///
    /// Adding a newsletter that already exists is a no-op and keeps its
    /// subscribers. Returns `true` only if a new topic was created.
    pub fn add_newsletter(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.topics.contains_key(&name) {
            return false;
        }
        debug!(topic = %name, "newsletter created");
        let topic = Topic::new(&name);
        self.topics.insert(name, topic);
        true
    }

    /// Whether `name` has been created.
    pub fn has_newsletter(&self, name: &str) -> bool {
        self.topics.contains_key(name)
    }

    /// Names of all newsletters, sorted.
    pub fn newsletters(&self) -> Vec<String> {
        let mut names: Vec<String> = self.topics.keys().cloned().collect();
        names.sort();
        names
    }

    /// Register `subscriber` on `newsletter`, keyed by its identity.
    /// Registering the same identity twice keeps a single entry.
    pub fn register(
        &mut self,
        newsletter: &str,
        subscriber: Arc<dyn Receive>,
    ) -> Result<(), DispatchError> {
        let topic = self.topic_mut(newsletter)?;
        let id = subscriber.id().clone();
        if topic.subscribe(subscriber) {
            debug!(topic = newsletter, subscriber = %id, "registered");
        } else {
            debug!(topic = newsletter, subscriber = %id, "registration replaced");
        }
        Ok(())
    }

    /// Remove `subscriber` from `newsletter`. Removing a subscriber that is not
    /// registered is not an error; the return value says whether one was removed.
    pub fn unregister(
        &mut self,
        newsletter: &str,
        subscriber: &SubscriberId,
    ) -> Result<bool, DispatchError> {
        let removed = self.topic_mut(newsletter)?.unsubscribe(subscriber);
        if removed {
            debug!(topic = newsletter, subscriber = %subscriber, "unregistered");
        }
        Ok(removed)
    }

    /// Snapshot of the subscribers registered on `newsletter`.
    pub fn get_subscriptions(&self, newsletter: &str) -> Result<Subscriptions, DispatchError> {
        Ok(self.topic(newsletter)?.snapshot())
    }

    /// Deliver `payload` to every subscriber of `newsletter`, in registration
    /// order. A newsletter without subscribers is a no-op.
    pub fn dispatch(
        &self,
        newsletter: &str,
        payload: impl Into<String>,
    ) -> Result<DispatchReport, DispatchError> {
        let topic = self.topic(newsletter)?;
        let message = Message::new(newsletter, payload);
        Ok(deliver(&message, topic.subscribers()))
    }

    /// Unregister a subscriber from every newsletter, for example when the
    /// receiver it stands for goes away. Returns how many registrations were removed.
    pub fn cleanup_subscriber(&mut self, subscriber: &SubscriberId) -> usize {
        let removed = self
            .topics
            .values_mut()
            .filter_map(|topic| topic.unsubscribe(subscriber).then_some(()))
            .count();
        debug!(subscriber = %subscriber, removed, "cleaned up subscriber");
        removed
    }

    pub(crate) fn topic(&self, name: &str) -> Result<&Topic, DispatchError> {
        self.topics
            .get(name)
            .ok_or_else(|| DispatchError::TopicNotFound(name.to_string()))
    }

    fn topic_mut(&mut self, name: &str) -> Result<&mut Topic, DispatchError> {
        self.topics
            .get_mut(name)
            .ok_or_else(|| DispatchError::TopicNotFound(name.to_string()))
    }
}

/// Offer `message` to each subscriber in turn. Failures are logged and
/// collected; they never cut the fanout short.
pub(crate) fn deliver(message: &Message, subscribers: &[Arc<dyn Receive>]) -> DispatchReport {
    let mut report = DispatchReport::default();
    for subscriber in subscribers {
        match subscriber.receive(message) {
            Ok(()) => report.delivered += 1,
            Err(error) => {
                warn!(
                    topic = %message.topic,
                    subscriber = %subscriber.id(),
                    name = subscriber.name(),
                    "delivery failed: {error}"
                );
                report.failures.push(DeliveryFailure {
                    subscriber: subscriber.id().clone(),
                    name: subscriber.name().to_string(),
                    error,
                });
            }
        }
    }
    debug!(
        topic = %message.topic,
        delivered = report.delivered,
        failed = report.failures.len(),
        "dispatched"
    );
    report
}

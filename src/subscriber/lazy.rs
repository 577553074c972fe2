//! Lazily initialised delivery target.
//!
//! A `LazySubscriber` stands in for a receiver that is expensive to build. It
//! is registered like any other subscriber, but the real target is only
//! constructed on the first delivery and cached for every delivery after that.
//! The loader runs at most once and is dropped once it has run.

use std::fmt;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::dispatcher::message::Message;
use crate::subscriber::{Receive, SubscriberId};
use crate::utils::error::DeliveryError;

type Loader<R> = Box<dyn FnOnce() -> R + Send>;

pub struct LazySubscriber<R: Receive> {
    id: SubscriberId,
    name: String,
    target: Lazy<R, Loader<R>>,
}

impl<R: Receive + 'static> LazySubscriber<R> {
    /// Wrap `loader`, which builds the real target on the first `receive`.
    pub fn new<F>(name: impl Into<String>, loader: F) -> Self
    where
        F: FnOnce() -> R + Send + 'static,
    {
        let id = SubscriberId::generate();
        let name = name.into();
        let (load_id, load_name) = (id.clone(), name.clone());
        let loader: Loader<R> = Box::new(move || {
            debug!(subscriber = %load_id, "load {load_name}");
            loader()
        });
        Self {
            id,
            name,
            target: Lazy::new(loader),
        }
    }
}

impl<R: Receive> LazySubscriber<R> {
    /// Whether the real target has been built yet.
    pub fn is_loaded(&self) -> bool {
        Lazy::get(&self.target).is_some()
    }
}

impl<R: Receive> Receive for LazySubscriber<R> {
    fn id(&self) -> &SubscriberId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn receive(&self, message: &Message) -> Result<(), DeliveryError> {
        Lazy::force(&self.target).receive(message)
    }
}

impl<R: Receive> fmt::Debug for LazySubscriber<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazySubscriber")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

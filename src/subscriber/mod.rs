//! The `subscriber` module defines what the dispatcher delivers to.
//!
//! Anything implementing [`Receive`] can be registered on a topic. Three
//! implementations ship with the crate:
//!
//! - [`Subscriber`]: a named receiver that reports `"<name> received: <payload>"`.
//! - [`ChannelSubscriber`]: forwards each message as JSON into a tokio channel.
//! - [`LazySubscriber`]: builds its real target on first delivery and reuses it.

pub mod channel;
pub mod lazy;
#[allow(clippy::module_inception)]
pub mod subscriber;

pub use channel::ChannelSubscriber;
pub use lazy::LazySubscriber;
pub use subscriber::{Receive, Subscriber, SubscriberId, Transcript};

//! # newsletter
//!
//! `newsletter` is a small, in-process publish/subscribe dispatcher. A
//! [`Dispatcher`](dispatcher::Dispatcher) owns named newsletters (topics);
//! subscribers register on them, and `dispatch` synchronously hands a message to
//! every subscriber of one newsletter, in registration order.
//!
//! ## Core Modules
//!
//! - `dispatcher`: topics, subscriber registries and fanout delivery, plus a
//!   thread-safe `SharedDispatcher` handle.
//! - `subscriber`: the `Receive` capability and the receivers shipped with the crate.
//! - `config`: loading settings from `config/default` and the environment.
//! - `utils`: error types and logging setup.

pub mod config;
pub mod dispatcher;
pub mod subscriber;
pub mod utils;

pub use dispatcher::{DispatchReport, Dispatcher, SharedDispatcher, Subscriptions};
pub use subscriber::{Receive, Subscriber, SubscriberId};
pub use utils::error::{DeliveryError, DispatchError};

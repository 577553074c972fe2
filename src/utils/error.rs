//! The `error` module defines the error types used within the `newsletter` crate.
//!
//! Two families exist. `DispatchError` is raised straight to the caller by any
//! dispatcher operation that looks up a topic. `DeliveryError` is produced by a
//! single subscriber while receiving; the dispatcher catches it and records it in
//! the `DispatchReport` instead of aborting the fanout.

use thiserror::Error;

use crate::subscriber::SubscriberId;

/// Errors returned by dispatcher operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("topic not found: {0}")]
    TopicNotFound(String),
}

/// Errors a subscriber may report while receiving a message.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("subscriber channel closed")]
    Closed,

    #[error("failed to write message: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("message rejected: {0}")]
    Rejected(String),
}

/// A delivery failure captured during dispatch.
#[derive(Debug)]
pub struct DeliveryFailure {
    pub subscriber: SubscriberId,
    pub name: String,
    pub error: DeliveryError,
}

//! Message definitions for the dispatcher
//!
//! `Message` is what every subscriber receives. The dispatcher builds one per
//! `dispatch` call and hands the same instance to each subscriber of the topic.
//!
//! Notes on fields:
//! - `topic`: name of the newsletter the message was dispatched on
//! - `payload`: message body as plain text
//! - `timestamp`: milliseconds since UNIX epoch; set by the dispatcher

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub topic: String,
    pub payload: String,
    pub timestamp: i64,
}

impl Message {
    /// Create a message stamped with the current time.
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

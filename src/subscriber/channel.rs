use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::dispatcher::message::Message;
use crate::subscriber::{Receive, SubscriberId};
use crate::utils::error::DeliveryError;

/// Forwards every received message, serialized to JSON, into an unbounded
/// tokio channel.
///
/// The receiving half is handed back at construction and is typically drained
/// by a spawned task. Once it is dropped, deliveries fail with
/// [`DeliveryError::Closed`].
#[derive(Debug, Clone)]
pub struct ChannelSubscriber {
    id: SubscriberId,
    name: String,
    sender: UnboundedSender<String>,
}

impl ChannelSubscriber {
    pub fn new(name: impl Into<String>) -> (Self, UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscriber = Self {
            id: SubscriberId::generate(),
            name: name.into(),
            sender: tx,
        };
        (subscriber, rx)
    }

    /// True once the receiving half has been dropped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl Receive for ChannelSubscriber {
    fn id(&self) -> &SubscriberId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn receive(&self, message: &Message) -> Result<(), DeliveryError> {
        let text = serde_json::to_string(message)?;
        self.sender.send(text).map_err(|_| DeliveryError::Closed)
    }
}

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::dispatcher::message::Message;
use crate::utils::error::DeliveryError;

/// Unique identity of a subscriber. This, not the display name, keys the
/// per-topic registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriberId(String);

impl SubscriberId {
    /// Generate a fresh identity.
    pub fn generate() -> Self {
        SubscriberId(format!("sub-{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubscriberId {
    fn from(s: &str) -> Self {
        SubscriberId(s.to_owned())
    }
}

impl From<String> for SubscriberId {
    fn from(s: String) -> Self {
        SubscriberId(s)
    }
}

/// The receive capability the dispatcher invokes on every subscriber of a topic.
pub trait Receive: Send + Sync {
    /// Registry key for this subscriber.
    fn id(&self) -> &SubscriberId;

    /// Display name, used in output and logs.
    fn name(&self) -> &str;

    /// React to a dispatched message.
    ///
    /// An error here is reported by the dispatcher and never stops delivery to
    /// the other subscribers of the topic.
    fn receive(&self, message: &Message) -> Result<(), DeliveryError>;
}

/// Shared, append-only record of lines written by subscribers.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    lines: Arc<Mutex<Vec<String>>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line.
    pub fn push(&self, line: String) {
        self.lines.lock().push(line);
    }

    /// Snapshot of all lines written so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// True until the first line is pushed.
    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}

type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

#[derive(Clone)]
enum Output {
    Stdout,
    Transcript(Transcript),
    Writer(SharedWriter),
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Stdout => f.write_str("Stdout"),
            Output::Transcript(t) => f.debug_tuple("Transcript").field(t).finish(),
            Output::Writer(_) => f.write_str("Writer"),
        }
    }
}

/// A named receiver.
///
/// Each received message produces the line `"<name> received: <payload>"`,
/// written to stdout, to any `io::Write` sink, or appended to a [`Transcript`].
/// A failed write is returned as [`DeliveryError::Io`]; `receive` never panics.
#[derive(Debug, Clone)]
pub struct Subscriber {
    id: SubscriberId,
    name: String,
    output: Output,
}

impl Subscriber {
    /// Create a subscriber that prints to stdout.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SubscriberId::generate(),
            name: name.into(),
            output: Output::Stdout,
        }
    }

    /// Create a subscriber that writes into `transcript`.
    pub fn with_transcript(name: impl Into<String>, transcript: Transcript) -> Self {
        Self {
            id: SubscriberId::generate(),
            name: name.into(),
            output: Output::Transcript(transcript),
        }
    }

    /// Create a subscriber that writes each line into `writer`.
    pub fn with_writer(name: impl Into<String>, writer: impl Write + Send + 'static) -> Self {
        Self {
            id: SubscriberId::generate(),
            name: name.into(),
            output: Output::Writer(Arc::new(Mutex::new(Box::new(writer)))),
        }
    }

    fn line_for(&self, message: &Message) -> String {
        format!("{} received: {}", self.name, message.payload)
    }
}

impl Receive for Subscriber {
    fn id(&self) -> &SubscriberId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn receive(&self, message: &Message) -> Result<(), DeliveryError> {
        let line = self.line_for(message);
        match &self.output {
            Output::Stdout => writeln!(io::stdout().lock(), "{line}")?,
            Output::Transcript(transcript) => transcript.push(line),
            Output::Writer(writer) => writeln!(writer.lock(), "{line}")?,
        }
        Ok(())
    }
}

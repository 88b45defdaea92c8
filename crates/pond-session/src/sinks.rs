use tokio::sync::broadcast;
use tracing::info;

use pond_core::{NotificationSink, SinkError};

/// Writes each nudge as a structured log line, the closest in-process
/// equivalent of printing to the operator's console.
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, text: &str) -> Result<(), SinkError> {
        info!(target: "pond::notify", "{text}");
        Ok(())
    }
}

/// Fans nudges out to in-process subscribers (server push, tests).
/// Sending with no live receivers counts as delivery failure, which the
/// monitor logs and swallows.
pub struct BroadcastSink {
    tx: broadcast::Sender<String>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}

impl NotificationSink for BroadcastSink {
    fn notify(&self, text: &str) -> Result<(), SinkError> {
        self.tx
            .send(text.to_string())
            .map(|_| ())
            .map_err(|_| SinkError::Unavailable("no live receivers".into()))
    }
}

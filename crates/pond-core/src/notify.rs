use crate::errors::SinkError;

/// Fire-and-forget delivery of a human-readable notification to the
/// operator. Failures are reported, never fatal to scoring.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, text: &str) -> Result<(), SinkError>;
}

/// A single log entry that cannot be normalized. Callers skip the entry and
/// continue; it never aborts a scoring pass.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error("record is missing its sender identity")]
    MissingSender,
    #[error("record is missing its timestamp")]
    MissingTimestamp,
}

/// Failure of the log-source collaborator. The only error class that may
/// propagate out of a scoring run.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("log source unavailable: {0}")]
    Unavailable(String),
    #[error("unknown partner: {0}")]
    UnknownPartner(String),
}

/// Failure of the notification sink. Logged and swallowed; scoring state is
/// never affected.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("notification sink unavailable: {0}")]
    Unavailable(String),
}

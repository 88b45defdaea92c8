use pond_core::RecordError;
use pond_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The event could not be normalized; nothing was ingested.
    #[error("malformed message event: {0}")]
    Malformed(#[from] RecordError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

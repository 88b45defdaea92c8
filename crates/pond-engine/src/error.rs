use pond_core::SourceError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("log source error: {0}")]
    Source(#[from] SourceError),
}

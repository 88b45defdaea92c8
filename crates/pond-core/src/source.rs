use crate::errors::SourceError;
use crate::ids::PartnerId;
use crate::record::RawMessage;

/// The log-retrieval collaborator. Implementations must preserve arrival
/// order; entries may be malformed and are skipped at normalization time.
pub trait LogSource: Send + Sync {
    /// Every known partner, stable identifiers.
    fn list_partners(&self) -> Result<Vec<PartnerId>, SourceError>;

    /// The complete ordered raw log for one partner.
    fn fetch_log(&self, partner: &PartnerId) -> Result<Vec<RawMessage>, SourceError>;

    /// Human-readable name for reporting only; scoring never needs it.
    fn display_name(&self, partner: &PartnerId) -> Option<String>;
}

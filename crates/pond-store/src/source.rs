use pond_core::{LogSource, PartnerId, RawMessage, SourceError};

use crate::database::Database;
use crate::messages::MessageRepo;
use crate::partners::PartnerRepo;

/// The persistence side of the engine's log-retrieval seam.
pub struct SqliteLogSource {
    partners: PartnerRepo,
    messages: MessageRepo,
}

impl SqliteLogSource {
    pub fn new(db: Database) -> Self {
        Self {
            partners: PartnerRepo::new(db.clone()),
            messages: MessageRepo::new(db),
        }
    }
}

impl LogSource for SqliteLogSource {
    fn list_partners(&self) -> Result<Vec<PartnerId>, SourceError> {
        let rows = self.partners.list()?;
        Ok(rows.into_iter().map(|row| row.id).collect())
    }

    fn fetch_log(&self, partner: &PartnerId) -> Result<Vec<RawMessage>, SourceError> {
        Ok(self.messages.fetch_log(partner)?)
    }

    fn display_name(&self, partner: &PartnerId) -> Option<String> {
        self.partners.get(partner).ok().and_then(|row| row.display_name)
    }
}

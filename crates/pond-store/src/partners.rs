use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use pond_core::PartnerId;

use crate::database::Database;
use crate::error::StoreError;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PartnerRow {
    pub id: PartnerId,
    pub display_name: Option<String>,
    pub created_at: String,
}

pub struct PartnerRepo {
    db: Database,
}

impl PartnerRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Get or create a partner row. A non-empty display name on an existing
    /// row is refreshed in place, since transports rename contacts freely.
    #[instrument(skip(self), fields(partner_id = %id))]
    pub fn get_or_create(
        &self,
        id: &PartnerId,
        display_name: Option<&str>,
    ) -> Result<PartnerRow, StoreError> {
        self.db.with_conn(|conn| {
            let existing = conn
                .query_row(
                    "SELECT id, display_name, created_at FROM partners WHERE id = ?1",
                    [id.as_str()],
                    row_to_partner,
                )
                .ok();

            if let Some(mut row) = existing {
                if let Some(name) = display_name {
                    if row.display_name.as_deref() != Some(name) {
                        conn.execute(
                            "UPDATE partners SET display_name = ?1 WHERE id = ?2",
                            rusqlite::params![name, id.as_str()],
                        )?;
                        row.display_name = Some(name.to_string());
                    }
                }
                return Ok(row);
            }

            let now = Utc::now().to_rfc3339();
            conn.execute(
                "INSERT INTO partners (id, display_name, created_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![id.as_str(), display_name, now],
            )?;

            Ok(PartnerRow {
                id: id.clone(),
                display_name: display_name.map(str::to_string),
                created_at: now,
            })
        })
    }

    /// Get a partner by ID.
    #[instrument(skip(self), fields(partner_id = %id))]
    pub fn get(&self, id: &PartnerId) -> Result<PartnerRow, StoreError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT id, display_name, created_at FROM partners WHERE id = ?1",
                [id.as_str()],
                row_to_partner,
            )
            .map_err(|_| StoreError::NotFound(format!("partner {id}")))
        })
    }

    /// Set or clear a partner's display name.
    #[instrument(skip(self), fields(partner_id = %id))]
    pub fn set_display_name(
        &self,
        id: &PartnerId,
        display_name: Option<&str>,
    ) -> Result<(), StoreError> {
        self.db.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE partners SET display_name = ?1 WHERE id = ?2",
                rusqlite::params![display_name, id.as_str()],
            )?;
            if changed == 0 {
                return Err(StoreError::NotFound(format!("partner {id}")));
            }
            Ok(())
        })
    }

    /// All known partners, oldest first.
    #[instrument(skip(self))]
    pub fn list(&self) -> Result<Vec<PartnerRow>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, display_name, created_at FROM partners ORDER BY created_at, id",
            )?;
            let rows = stmt
                .query_map([], row_to_partner)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn row_to_partner(row: &rusqlite::Row<'_>) -> Result<PartnerRow, rusqlite::Error> {
    Ok(PartnerRow {
        id: PartnerId::from_raw(row.get::<_, String>(0)?),
        display_name: row.get(1)?,
        created_at: row.get(2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> PartnerRepo {
        PartnerRepo::new(Database::in_memory().unwrap())
    }

    #[test]
    fn create_partner() {
        let repo = repo();
        let row = repo
            .get_or_create(&PartnerId::from_raw("wx_alice"), Some("Alice"))
            .unwrap();
        assert_eq!(row.id.as_str(), "wx_alice");
        assert_eq!(row.display_name.as_deref(), Some("Alice"));
    }

    #[test]
    fn get_or_create_returns_existing() {
        let repo = repo();
        let id = PartnerId::from_raw("wx_alice");
        let first = repo.get_or_create(&id, Some("Alice")).unwrap();
        let second = repo.get_or_create(&id, None).unwrap();
        assert_eq!(first.created_at, second.created_at);
        // omitted name keeps the stored one
        assert_eq!(second.display_name.as_deref(), Some("Alice"));
    }

    #[test]
    fn get_or_create_refreshes_the_display_name() {
        let repo = repo();
        let id = PartnerId::from_raw("wx_alice");
        repo.get_or_create(&id, Some("Alice")).unwrap();
        let renamed = repo.get_or_create(&id, Some("Allie")).unwrap();
        assert_eq!(renamed.display_name.as_deref(), Some("Allie"));
        assert_eq!(repo.get(&id).unwrap().display_name.as_deref(), Some("Allie"));
    }

    #[test]
    fn get_nonexistent_fails() {
        let result = repo().get(&PartnerId::from_raw("wx_nobody"));
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn set_display_name() {
        let repo = repo();
        let id = PartnerId::from_raw("wx_alice");
        repo.get_or_create(&id, None).unwrap();
        repo.set_display_name(&id, Some("Alice")).unwrap();
        assert_eq!(repo.get(&id).unwrap().display_name.as_deref(), Some("Alice"));

        repo.set_display_name(&id, None).unwrap();
        assert_eq!(repo.get(&id).unwrap().display_name, None);
    }

    #[test]
    fn set_display_name_for_unknown_partner_fails() {
        let result = repo().set_display_name(&PartnerId::from_raw("wx_nobody"), Some("x"));
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn list_partners() {
        let repo = repo();
        repo.get_or_create(&PartnerId::from_raw("a"), None).unwrap();
        repo.get_or_create(&PartnerId::from_raw("b"), Some("B")).unwrap();
        let all = repo.list().unwrap();
        assert_eq!(all.len(), 2);
    }
}

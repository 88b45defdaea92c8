use chrono::Utc;
use tracing::instrument;

use pond_core::{PartnerId, RawMessage};

use crate::database::Database;
use crate::error::StoreError;

/// Append-only message log, one sequence per partner. `seq` preserves
/// arrival order; declared timestamps are stored as-is.
pub struct MessageRepo {
    db: Database,
}

impl MessageRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Append one raw event, malformed or not. Returns the assigned seq.
    #[instrument(skip(self, raw), fields(partner_id = %partner))]
    pub fn append(&self, partner: &PartnerId, raw: &RawMessage) -> Result<i64, StoreError> {
        self.db.with_conn(|conn| {
            let kind = if raw.kind.is_empty() {
                "text"
            } else {
                raw.kind.as_str()
            };
            conn.execute(
                "INSERT INTO messages (partner_id, sender, timestamp, kind, text, received_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    partner.as_str(),
                    raw.sender,
                    raw.timestamp,
                    kind,
                    raw.text,
                    Utc::now().to_rfc3339(),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// The complete raw log for one partner in arrival order.
    #[instrument(skip(self), fields(partner_id = %partner))]
    pub fn fetch_log(&self, partner: &PartnerId) -> Result<Vec<RawMessage>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT sender, timestamp, kind, text FROM messages
                 WHERE partner_id = ?1 ORDER BY seq",
            )?;
            let rows = stmt
                .query_map([partner.as_str()], |row| {
                    Ok(RawMessage {
                        sender: row.get(0)?,
                        timestamp: row.get(1)?,
                        kind: row.get(2)?,
                        text: row.get(3)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn count_for_partner(&self, partner: &PartnerId) -> Result<u64, StoreError> {
        self.db.with_conn(|conn| {
            let count: u64 = conn.query_row(
                "SELECT COUNT(*) FROM messages WHERE partner_id = ?1",
                [partner.as_str()],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partners::PartnerRepo;

    fn setup() -> (MessageRepo, PartnerRepo, PartnerId) {
        let db = Database::in_memory().unwrap();
        let partners = PartnerRepo::new(db.clone());
        let id = PartnerId::from_raw("wx_alice");
        partners.get_or_create(&id, Some("Alice")).unwrap();
        (MessageRepo::new(db), partners, id)
    }

    #[test]
    fn append_and_fetch_preserve_arrival_order() {
        let (messages, _, alice) = setup();
        // declared timestamps deliberately out of order
        messages.append(&alice, &RawMessage::text("me", 100, "first")).unwrap();
        messages.append(&alice, &RawMessage::text("wx_alice", 50, "second")).unwrap();
        messages.append(&alice, &RawMessage::text("me", 70, "third")).unwrap();

        let log = messages.fetch_log(&alice).unwrap();
        let texts: Vec<_> = log.iter().map(|m| m.text.as_deref().unwrap()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
        assert_eq!(log[1].timestamp, Some(50));
    }

    #[test]
    fn seq_increments_per_append() {
        let (messages, _, alice) = setup();
        let a = messages.append(&alice, &RawMessage::text("me", 0, "a")).unwrap();
        let b = messages.append(&alice, &RawMessage::text("me", 1, "b")).unwrap();
        assert!(b > a);
    }

    #[test]
    fn malformed_events_round_trip_verbatim() {
        let (messages, _, alice) = setup();
        let ghost = RawMessage {
            sender: None,
            timestamp: None,
            kind: "text".into(),
            text: Some("ghost".into()),
        };
        messages.append(&alice, &ghost).unwrap();

        let log = messages.fetch_log(&alice).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].sender, None);
        assert_eq!(log[0].timestamp, None);
        assert_eq!(log[0].text.as_deref(), Some("ghost"));
    }

    #[test]
    fn empty_kind_defaults_to_text() {
        let (messages, _, alice) = setup();
        let raw = RawMessage {
            sender: Some("me".into()),
            timestamp: Some(0),
            kind: String::new(),
            text: Some("hi".into()),
        };
        messages.append(&alice, &raw).unwrap();
        assert_eq!(messages.fetch_log(&alice).unwrap()[0].kind, "text");
    }

    #[test]
    fn logs_are_per_partner() {
        let (messages, partners, alice) = setup();
        let bob = PartnerId::from_raw("wx_bob");
        partners.get_or_create(&bob, None).unwrap();

        messages.append(&alice, &RawMessage::text("me", 0, "to alice")).unwrap();
        messages.append(&bob, &RawMessage::text("me", 0, "to bob")).unwrap();

        assert_eq!(messages.count_for_partner(&alice).unwrap(), 1);
        assert_eq!(messages.count_for_partner(&bob).unwrap(), 1);
        assert_eq!(
            messages.fetch_log(&bob).unwrap()[0].text.as_deref(),
            Some("to bob")
        );
    }

    #[test]
    fn unknown_partner_append_violates_the_foreign_key() {
        let (messages, _, _) = setup();
        let result = messages.append(
            &PartnerId::from_raw("wx_nobody"),
            &RawMessage::text("me", 0, "hi"),
        );
        assert!(matches!(result, Err(StoreError::Database(_))));
    }
}

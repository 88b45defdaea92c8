use std::path::Path;

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

/// Every scoring-time recovery (skipped record, unreachable log, dropped
/// nudge) warns with a `partner` field; persisting that column is what lets
/// an operator ask "what went wrong with this contact" later.
const LOG_DDL: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;

CREATE TABLE IF NOT EXISTS logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    logged_at TEXT NOT NULL,
    level TEXT NOT NULL,
    target TEXT NOT NULL,
    message TEXT NOT NULL,
    partner_id TEXT,
    detail TEXT
);

CREATE INDEX IF NOT EXISTS idx_logs_partner ON logs(partner_id, id);
"#;

/// A persisted warn+ record, as served back by the log query surface.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogRecord {
    pub id: i64,
    pub logged_at: String,
    pub level: String,
    pub target: String,
    pub message: String,
    pub partner_id: Option<String>,
    /// Remaining event fields as a JSON object, if any.
    pub detail: Option<String>,
}

/// Filters for reading records back. Deserializable so the server can take
/// it straight from a query string.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LogQuery {
    pub partner_id: Option<String>,
    pub level: Option<String>,
    pub since: Option<String>,
    pub limit: Option<u32>,
}

/// One record on its way into the sink; `logged_at` is stamped at insert.
#[derive(Clone, Debug)]
pub struct NewLogRecord {
    pub level: String,
    pub target: String,
    pub message: String,
    pub partner_id: Option<String>,
    pub detail: Option<String>,
}

/// SQLite sink that persists warn+ logs, partner-scoped where the event
/// says so.
pub struct SqliteLogSink {
    conn: Mutex<Connection>,
}

impl SqliteLogSink {
    pub fn new(db_path: &Path) -> Result<Self, rusqlite::Error> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        Self::with_conn(Connection::open(db_path)?)
    }

    /// In-memory sink (for testing).
    pub fn in_memory() -> Result<Self, rusqlite::Error> {
        Self::with_conn(Connection::open_in_memory()?)
    }

    fn with_conn(conn: Connection) -> Result<Self, rusqlite::Error> {
        conn.execute_batch(LOG_DDL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Persist one record. Failures are ignored; logging must never take
    /// the caller down with it.
    pub fn record(&self, rec: NewLogRecord) {
        let conn = self.conn.lock();
        let _ = conn.execute(
            "INSERT INTO logs (logged_at, level, target, message, partner_id, detail)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                Utc::now().to_rfc3339(),
                rec.level,
                rec.target,
                rec.message,
                rec.partner_id,
                rec.detail,
            ],
        );
    }

    /// Most recent records first, filtered by whatever the query names.
    pub fn query(&self, q: &LogQuery) -> Result<Vec<LogRecord>, rusqlite::Error> {
        let level = q.level.as_ref().map(|l| l.to_uppercase());
        let limit = q.limit.unwrap_or(100);

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, logged_at, level, target, message, partner_id, detail
             FROM logs
             WHERE (?1 IS NULL OR partner_id = ?1)
               AND (?2 IS NULL OR level = ?2)
               AND (?3 IS NULL OR logged_at >= ?3)
             ORDER BY id DESC
             LIMIT ?4",
        )?;
        let rows = stmt.query_map(
            rusqlite::params![q.partner_id, level, q.since, limit],
            |row| {
                Ok(LogRecord {
                    id: row.get(0)?,
                    logged_at: row.get(1)?,
                    level: row.get(2)?,
                    target: row.get(3)?,
                    message: row.get(4)?,
                    partner_id: row.get(5)?,
                    detail: row.get(6)?,
                })
            },
        )?;
        rows.collect()
    }
}

/// tracing Layer feeding the sink. Partner attribution comes off the event
/// itself — every recovery site tags its warning with `partner` directly,
/// so no span bookkeeping is needed.
pub struct SqliteLogLayer {
    sink: std::sync::Arc<SqliteLogSink>,
}

impl SqliteLogLayer {
    pub fn new(sink: std::sync::Arc<SqliteLogSink>) -> Self {
        Self { sink }
    }
}

impl<S: tracing::Subscriber> Layer<S> for SqliteLogLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        // warn and error only
        let level = *event.metadata().level();
        if level > tracing::Level::WARN {
            return;
        }

        let mut fields = EventFields::default();
        event.record(&mut fields);

        let detail = if fields.rest.is_empty() {
            None
        } else {
            Some(serde_json::Value::Object(fields.rest).to_string())
        };

        self.sink.record(NewLogRecord {
            level: level.to_string().to_uppercase(),
            target: event.metadata().target().to_string(),
            message: fields.message.unwrap_or_default(),
            partner_id: fields.partner_id,
            detail,
        });
    }
}

/// Splits an event into message, partner attribution, and the rest.
/// Non-string values arrive through `record_debug` and are kept as their
/// rendered form; the detail column is for reading, not re-parsing.
#[derive(Default)]
struct EventFields {
    message: Option<String>,
    partner_id: Option<String>,
    rest: serde_json::Map<String, serde_json::Value>,
}

impl EventFields {
    fn take(&mut self, name: &str, value: String) {
        match name {
            "message" => self.message = Some(value),
            "partner" | "partner_id" => self.partner_id = Some(value),
            _ => {
                self.rest
                    .insert(name.to_string(), serde_json::Value::String(value));
            }
        }
    }
}

impl Visit for EventFields {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let rendered = format!("{value:?}");
        self.take(field.name(), rendered.trim_matches('"').to_string());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.take(field.name(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warn(partner: Option<&str>, message: &str) -> NewLogRecord {
        NewLogRecord {
            level: "WARN".into(),
            target: "pond_engine::aggregator".into(),
            message: message.into(),
            partner_id: partner.map(str::to_string),
            detail: None,
        }
    }

    #[test]
    fn record_and_read_back() {
        let sink = SqliteLogSink::in_memory().unwrap();
        sink.record(NewLogRecord {
            detail: Some(r#"{"error":"record is missing its timestamp"}"#.into()),
            ..warn(Some("wx_alice"), "skipping malformed record")
        });

        let records = sink.query(&LogQuery::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "skipping malformed record");
        assert_eq!(records[0].partner_id.as_deref(), Some("wx_alice"));
        assert!(records[0].detail.as_deref().unwrap().contains("timestamp"));
        assert!(!records[0].logged_at.is_empty());
    }

    #[test]
    fn query_scopes_to_one_partner() {
        let sink = SqliteLogSink::in_memory().unwrap();
        sink.record(warn(Some("wx_alice"), "skipping malformed record"));
        sink.record(warn(Some("wx_bob"), "log unreachable, partner skipped"));
        sink.record(warn(None, "notification dropped"));

        let records = sink
            .query(&LogQuery {
                partner_id: Some("wx_alice".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].partner_id.as_deref(), Some("wx_alice"));
    }

    #[test]
    fn level_filter_is_case_insensitive() {
        let sink = SqliteLogSink::in_memory().unwrap();
        sink.record(warn(None, "a warning"));
        sink.record(NewLogRecord {
            level: "ERROR".into(),
            ..warn(None, "an error")
        });

        let records = sink
            .query(&LogQuery {
                level: Some("error".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "an error");
    }

    #[test]
    fn newest_first_and_limited() {
        let sink = SqliteLogSink::in_memory().unwrap();
        for i in 0..5 {
            sink.record(warn(Some("wx_alice"), &format!("warn {i}")));
        }

        let records = sink
            .query(&LogQuery {
                limit: Some(2),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].message, "warn 4");
        assert_eq!(records[1].message, "warn 3");
    }

    #[test]
    fn since_filters_on_the_stamped_time() {
        let sink = SqliteLogSink::in_memory().unwrap();
        sink.record(warn(None, "early"));

        // everything stamped so far is in the past relative to this bound
        let records = sink
            .query(&LogQuery {
                since: Some("2099-01-01T00:00:00Z".into()),
                ..Default::default()
            })
            .unwrap();
        assert!(records.is_empty());

        let records = sink
            .query(&LogQuery {
                since: Some("2000-01-01T00:00:00Z".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn file_backed_sink_creates_its_directory() {
        let dir = std::env::temp_dir().join(format!("pond-logs-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("nested/logs.db");

        let sink = SqliteLogSink::new(&path).unwrap();
        sink.record(warn(None, "hello"));
        assert!(path.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn event_fields_split_partner_from_detail() {
        let mut fields = EventFields::default();
        fields.take("message", "skipping malformed record".into());
        fields.take("partner", "wx_alice".into());
        fields.take("error", "record is missing its sender identity".into());

        assert_eq!(fields.message.as_deref(), Some("skipping malformed record"));
        assert_eq!(fields.partner_id.as_deref(), Some("wx_alice"));
        assert_eq!(fields.rest.len(), 1);
        assert!(fields.rest.contains_key("error"));
    }

    #[test]
    fn log_record_serde_roundtrip() {
        let record = LogRecord {
            id: 1,
            logged_at: "2026-08-01T12:00:00Z".into(),
            level: "WARN".into(),
            target: "pond_session".into(),
            message: "notification dropped".into(),
            partner_id: Some("wx_alice".into()),
            detail: Some(r#"{"error":"sink offline"}"#.into()),
        };
        let json = serde_json::to_string(&record).unwrap();
        let parsed: LogRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, 1);
        assert_eq!(parsed.partner_id.as_deref(), Some("wx_alice"));
    }
}

/// SQL DDL for the pond-store database.
/// WAL mode + foreign keys enabled at connection time.
pub const SCHEMA_VERSION: u32 = 1;

/// `messages.seq` is the arrival-order key for a partner's log; `timestamp`
/// is whatever the transport declared and may be out of order or missing.
/// `sender`/`timestamp` are nullable so a malformed event survives the
/// round-trip verbatim and is skipped at scoring time, not at ingest time.
pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS partners (
    id TEXT PRIMARY KEY,
    display_name TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS messages (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    partner_id TEXT NOT NULL REFERENCES partners(id),
    sender TEXT,
    timestamp INTEGER,
    kind TEXT NOT NULL DEFAULT 'text',
    text TEXT,
    received_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_messages_partner_seq ON messages(partner_id, seq);

CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);
"#;

pub const PRAGMAS: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;
PRAGMA synchronous = NORMAL;
"#;

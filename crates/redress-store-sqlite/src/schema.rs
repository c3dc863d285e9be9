//! SQL schema for the Redress SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS actors (
    actor_id      TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    display_name  TEXT NOT NULL,
    role          TEXT NOT NULL,    -- 'student' | 'faculty' | 'admin'
    password_hash TEXT NOT NULL,    -- argon2 PHC string
    created_at    TEXT NOT NULL
);

-- Classification reference data; a subcategory is a row whose parent_id
-- points at another category.
CREATE TABLE IF NOT EXISTS categories (
    category_id TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    parent_id   TEXT REFERENCES categories(category_id),
    description TEXT,
    created_at  TEXT NOT NULL
);

-- One row per UTC date. next_seq is bumped in the same transaction that
-- inserts the complaint, so identifiers are minted serially and two
-- same-date creates can never collide.
CREATE TABLE IF NOT EXISTS complaint_sequences (
    seq_date TEXT PRIMARY KEY,      -- YYYYMMDD
    next_seq INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS complaints (
    complaint_no          TEXT PRIMARY KEY,   -- CMP-YYYYMMDD-XXXXXX
    title                 TEXT NOT NULL,
    description           TEXT NOT NULL,
    category_id           TEXT NOT NULL REFERENCES categories(category_id),
    priority              TEXT NOT NULL DEFAULT 'medium',
    status                TEXT NOT NULL DEFAULT 'pending',
    created_by            TEXT NOT NULL REFERENCES actors(actor_id),
    assigned_to           TEXT REFERENCES actors(actor_id),
    attachment_path       TEXT,
    attachment_size       INTEGER,
    attachment_media_type TEXT,
    created_at            TEXT NOT NULL,
    updated_at            TEXT NOT NULL,
    resolved_at           TEXT
);

-- The audit trail is strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS complaint_history (
    history_id   TEXT PRIMARY KEY,
    complaint_no TEXT NOT NULL REFERENCES complaints(complaint_no),
    actor_id     TEXT NOT NULL REFERENCES actors(actor_id),
    kind         TEXT NOT NULL,    -- 'created' | 'assigned' | 'status_changed' | 'reopened'
    from_status  TEXT,             -- NULL on the 'created' entry
    to_status    TEXT NOT NULL,
    remark       TEXT,
    recorded_at  TEXT NOT NULL
);

-- At most one feedback per complaint.
CREATE TABLE IF NOT EXISTS feedback (
    feedback_id  TEXT PRIMARY KEY,
    complaint_no TEXT NOT NULL REFERENCES complaints(complaint_no),
    actor_id     TEXT NOT NULL REFERENCES actors(actor_id),
    rating       INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
    comment      TEXT,
    created_at   TEXT NOT NULL,
    UNIQUE (complaint_no)
);

CREATE TABLE IF NOT EXISTS notifications (
    notification_id TEXT PRIMARY KEY,
    actor_id        TEXT NOT NULL REFERENCES actors(actor_id),
    message         TEXT NOT NULL,
    is_read         INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS complaints_status_idx   ON complaints(status);
CREATE INDEX IF NOT EXISTS complaints_creator_idx  ON complaints(created_by);
CREATE INDEX IF NOT EXISTS complaints_assignee_idx ON complaints(assigned_to);
CREATE INDEX IF NOT EXISTS complaints_created_idx  ON complaints(created_at);
CREATE INDEX IF NOT EXISTS history_complaint_idx   ON complaint_history(complaint_no);
CREATE INDEX IF NOT EXISTS notifications_actor_idx ON notifications(actor_id);

PRAGMA user_version = 1;
";

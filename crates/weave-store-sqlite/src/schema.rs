//! SQL schema for the Story Weave SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per story. Rows are never deleted; only `sentences` and
-- `sentence_count` change, and only through a conditional UPDATE.
CREATE TABLE IF NOT EXISTS stories (
    story_id       TEXT PRIMARY KEY,
    created_at     TEXT NOT NULL,      -- RFC 3339 UTC, fixed-width nanos
    sentences      TEXT NOT NULL,      -- JSON array of strings
    sentence_count INTEGER NOT NULL CHECK (sentence_count >= 1)
);

CREATE INDEX IF NOT EXISTS stories_created_idx ON stories(created_at);

PRAGMA user_version = 1;
";

//! SQL schema for the Siteline SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS assessments (
    assessment_id TEXT PRIMARY KEY,
    answers_json  TEXT NOT NULL,   -- immutable submission snapshot
    score_json    TEXT NOT NULL,   -- total + breakdown + category label
    status        TEXT NOT NULL,   -- 'processing' | 'completed' | 'error'
    tier          TEXT NOT NULL,   -- 'tier1' | 'tier2' | 'tier3'
    report_json   TEXT,            -- set exactly once, on completion
    error_detail  TEXT,
    created_at    TEXT NOT NULL,   -- ISO 8601 UTC; store-assigned
    processed_at  TEXT,
    paid_at       TEXT,
    user_id       TEXT             -- NULL for anonymous submissions
);

-- The PRIMARY KEY is the uniqueness constraint the token generator
-- retries against.
CREATE TABLE IF NOT EXISTS public_tokens (
    token         TEXT PRIMARY KEY,
    assessment_id TEXT NOT NULL REFERENCES assessments(assessment_id),
    created_at    TEXT NOT NULL,
    expires_at    TEXT NOT NULL
);

-- Append-only payment ledger. The PRIMARY KEY on the external session id
-- is the idempotency boundary: a replayed delivery cannot double-append,
-- even when the copies arrive concurrently.
CREATE TABLE IF NOT EXISTS payments (
    session_id    TEXT PRIMARY KEY,
    assessment_id TEXT NOT NULL,
    amount_total  INTEGER NOT NULL, -- minor units (cents)
    currency      TEXT NOT NULL,
    status        TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS tokens_expires_idx      ON public_tokens(expires_at);
CREATE INDEX IF NOT EXISTS payments_assessment_idx ON payments(assessment_id);

PRAGMA user_version = 1;
";

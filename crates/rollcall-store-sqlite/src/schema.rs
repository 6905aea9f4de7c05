//! SQL schema for the Rollcall SQLite store.
//!
//! Executed once at connection startup. Future migrations will be
//! gated on `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS offerings (
    offering_id TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    capacity    INTEGER NOT NULL CHECK (capacity >= 0),
    occupancy   INTEGER NOT NULL DEFAULT 0 CHECK (occupancy >= 0),
    status      TEXT NOT NULL,   -- 'active' | 'pending' | 'closed'
    created_at  TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

-- One row per (subject, offering) pair, ever. A terminated row is
-- reset in place on reactivation instead of inserting a new one.
CREATE TABLE IF NOT EXISTS enrollments (
    enrollment_id   TEXT PRIMARY KEY,
    subject_id      TEXT NOT NULL,
    offering_id     TEXT NOT NULL REFERENCES offerings(offering_id),
    status          TEXT NOT NULL,
    rejection_count INTEGER NOT NULL DEFAULT 0,
    remarks         TEXT,
    cancelled_at    TEXT,
    payment         TEXT,            -- opaque JSON payment attachment
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL,
    UNIQUE (subject_id, offering_id)
);

CREATE INDEX IF NOT EXISTS enrollments_offering_idx ON enrollments(offering_id);
CREATE INDEX IF NOT EXISTS enrollments_subject_idx  ON enrollments(subject_id);
CREATE INDEX IF NOT EXISTS enrollments_status_idx   ON enrollments(status);

PRAGMA user_version = 1;
";

//! SQL schema for the Tally SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Criteria and levels are embedded values, stored as one JSON array.
CREATE TABLE IF NOT EXISTS rubrics (
    rubric_id       TEXT PRIMARY KEY,
    organization_id TEXT NOT NULL,
    name            TEXT NOT NULL,
    description     TEXT NOT NULL DEFAULT '',
    is_default      INTEGER NOT NULL DEFAULT 0 CHECK (is_default IN (0, 1)),
    criteria_json   TEXT NOT NULL DEFAULT '[]',
    created_by      TEXT NOT NULL,
    created_at      TEXT NOT NULL,   -- RFC 3339 UTC, fixed width
    updated_at      TEXT NOT NULL
);

-- At most one default rubric per organization.
CREATE UNIQUE INDEX IF NOT EXISTS rubrics_one_default_idx
    ON rubrics(organization_id) WHERE is_default = 1;

CREATE INDEX IF NOT EXISTS rubrics_org_idx ON rubrics(organization_id);

-- Only the grading-related slice of a submission lives here.
-- rubric_id is a historical reference, not a foreign key: removing a rubric
-- must not rewrite grades already awarded with it.
CREATE TABLE IF NOT EXISTS submissions (
    submission_id    TEXT PRIMARY KEY,
    organization_id  TEXT NOT NULL,
    instructor_id    TEXT NOT NULL,
    rubric_id        TEXT,
    automatic_score  REAL,
    manual_score     REAL,
    criterion_scores TEXT,           -- JSON array or NULL
    grading_status   TEXT NOT NULL,  -- 'pending' | 'grading' | 'graded' | 'auto_graded'
    completed_at     TEXT NOT NULL,
    graded_at        TEXT
);

CREATE INDEX IF NOT EXISTS submissions_org_idx
    ON submissions(organization_id);
CREATE INDEX IF NOT EXISTS submissions_instructor_status_idx
    ON submissions(instructor_id, grading_status);

PRAGMA user_version = 1;
";

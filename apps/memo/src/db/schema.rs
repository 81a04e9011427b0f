//! SQLite schema definitions.

/// Current schema version for migrations.
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema for the problem store.
pub const SCHEMA: &str = r#"
-- One row per discovered review item; id is the path relative to the scan root
CREATE TABLE IF NOT EXISTS problems (
    id TEXT PRIMARY KEY,
    due_date TEXT NOT NULL,
    easiness REAL NOT NULL DEFAULT 2.5,
    interval INTEGER NOT NULL DEFAULT 0,
    streak INTEGER NOT NULL DEFAULT 0,
    last_grade INTEGER NOT NULL DEFAULT 0
);

-- Per-day grade counters
CREATE TABLE IF NOT EXISTS daily_stats (
    date TEXT PRIMARY KEY,
    m0 INTEGER NOT NULL DEFAULT 0,
    m1 INTEGER NOT NULL DEFAULT 0,
    m2 INTEGER NOT NULL DEFAULT 0,
    m3 INTEGER NOT NULL DEFAULT 0,
    m4 INTEGER NOT NULL DEFAULT 0,
    m5 INTEGER NOT NULL DEFAULT 0,
    completed INTEGER NOT NULL DEFAULT 0
);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_problems_due ON problems(due_date);
CREATE INDEX IF NOT EXISTS idx_problems_grade ON problems(last_grade);
"#;

/// Record the schema version if not exists.
pub const INIT_SCHEMA_VERSION: &str = "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)";

//! Database schema definitions for the preference container.
//!
//! One logical table keyed by preference name. Values are stored as JSON text
//! and never interpreted by the store.

pub const PREFERENCES_DB_NAME: &str = "preferences.db";

/// Declared schema version, persisted in `PRAGMA user_version`.
pub const PREFERENCES_SCHEMA_VERSION: u32 = 1;

pub const PREFERENCES_DB_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS preferences (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        timestamp INTEGER NOT NULL
    )
";

pub const PREFERENCES_DB_SCHEMA_INDEX: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_preferences_key ON preferences(key)";

pub const UPSERT_PREFERENCE: &str = "
    INSERT INTO preferences (key, value, timestamp) VALUES (?1, ?2, ?3)
    ON CONFLICT(key) DO UPDATE SET value = excluded.value, timestamp = excluded.timestamp
";

pub const SELECT_PREFERENCE: &str = "SELECT value, timestamp FROM preferences WHERE key = ?1";

pub const SELECT_ALL_PREFERENCES: &str = "SELECT key, value FROM preferences";

pub const DELETE_PREFERENCE: &str = "DELETE FROM preferences WHERE key = ?1";

pub const CLEAR_PREFERENCES: &str = "DELETE FROM preferences";

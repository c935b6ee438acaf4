//! SQLite schema for the slot store
//!
//! The schema version is kept in `PRAGMA user_version`, so a freshly
//! created database reports version 0.

use rusqlite::{Connection, Result};

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

const CREATE_SLOTS: &str = r#"
    CREATE TABLE IF NOT EXISTS slots (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at INTEGER NOT NULL
    );
"#;

/// Create the slot table and stamp the schema version
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_SLOTS)?;
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)
}

/// Schema version recorded in the database
pub fn schema_version(conn: &Connection) -> Result<i32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
}

/// True when the database is older than [`SCHEMA_VERSION`]
pub fn needs_init(conn: &Connection) -> bool {
    schema_version(conn).map_or(true, |version| version < SCHEMA_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_table(conn: &Connection, name: &str) -> bool {
        conn.prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")
            .and_then(|mut stmt| stmt.exists([name]))
            .unwrap()
    }

    #[test]
    fn test_fresh_database_needs_init() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(schema_version(&conn).unwrap(), 0);
        assert!(needs_init(&conn));
        assert!(!has_table(&conn, "slots"));
    }

    #[test]
    fn test_init_creates_slots_and_stamps_version() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        assert!(has_table(&conn, "slots"));
        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
        assert!(!needs_init(&conn));
    }

    #[test]
    fn test_init_keeps_existing_slots() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO slots (key, value, updated_at) VALUES ('a', '[]', 0)",
            [],
        )
        .unwrap();

        init_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM slots", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_newer_database_is_left_alone() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn.pragma_update(None, "user_version", SCHEMA_VERSION + 1)
            .unwrap();
        assert!(!needs_init(&conn));
    }
}

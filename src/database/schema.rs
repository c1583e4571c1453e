use log::debug;
use rusqlite::Connection;

/// Create the database schema
pub fn create_schema(conn: &mut Connection) -> rusqlite::Result<()> {
    debug!("Creating database schema");

    // Use a transaction so a half-created schema is never left behind
    let tx = conn.transaction()?;

    tx.execute(
        "CREATE TABLE IF NOT EXISTS snapshots (
            key TEXT PRIMARY KEY,
            data TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    tx.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_creation_is_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();

        create_schema(&mut conn).unwrap();
        create_schema(&mut conn).unwrap();

        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?)",
                ["snapshots"],
                |row| row.get(0),
            )
            .unwrap();

        assert!(exists, "Table 'snapshots' should exist");
    }
}

use std::path::Path;

use rusqlite::Connection;

/// File name of the database inside the storage directory.
pub const DB_FILE: &str = ".items_db.db";

// AUTOINCREMENT keeps ids from being handed out twice, even after every row
// has been deleted.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS items (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    summary TEXT NOT NULL CHECK(length(summary) > 0),
    owner   TEXT NOT NULL DEFAULT '',
    state   TEXT NOT NULL DEFAULT 'todo'
);
";

fn set_pragmas(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA busy_timeout = 5000;",
    )
}

pub fn open(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    set_pragmas(&conn)?;
    init(&conn)?;
    Ok(conn)
}

pub fn init(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)
}

pub fn open_memory() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    set_pragmas(&conn)?;
    init(&conn)?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let conn = open_memory().unwrap();
        init(&conn).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn empty_summary_rejected_by_schema() {
        let conn = open_memory().unwrap();
        let res = conn.execute("INSERT INTO items (summary) VALUES ('')", []);
        assert!(res.is_err());
    }

    #[test]
    fn reopening_file_keeps_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DB_FILE);
        {
            let conn = open(&path).unwrap();
            conn.execute("INSERT INTO items (summary) VALUES ('kept')", [])
                .unwrap();
        }
        let conn = open(&path).unwrap();
        let summary: String = conn
            .query_row("SELECT summary FROM items", [], |row| row.get(0))
            .unwrap();
        assert_eq!(summary, "kept");
    }
}

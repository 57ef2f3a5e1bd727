//! Raw persistence of item rows.
//!
//! The store does no domain validation and never reports a missing row as an
//! error: `None` or a zero row count is the signal, and `ItemsDb` decides what
//! it means.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::db;
use crate::error::Result;
use crate::model::{Field, Item};

const ITEM_COLUMNS: &str = "SELECT id, summary, owner, state FROM items";

pub trait RecordStore {
    /// Insert `item` as a new row and write the assigned id back into it.
    fn create(&self, item: &mut Item) -> Result<i64>;
    fn read(&self, id: i64) -> Result<Option<Item>>;
    fn read_all(&self) -> Result<Vec<Item>>;
    /// Apply `fields` to the row with `id`, returning the number of rows
    /// matched. An empty `fields` still reports whether the row exists.
    fn update(&self, id: i64, fields: &[(Field, String)]) -> Result<usize>;
    fn delete(&self, id: i64) -> Result<usize>;
    fn delete_all(&self) -> Result<usize>;
    fn count(&self) -> Result<usize>;
    fn close(self) -> Result<()>
    where
        Self: Sized;
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<Item> {
    Ok(Item {
        id: Some(row.get(0)?),
        summary: row.get(1)?,
        owner: Some(row.get(2)?),
        state: row.get(3)?,
    })
}

/// SQLite-backed store over the `items` table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            conn: db::open(path)?,
        })
    }

    pub fn open_memory() -> Result<Self> {
        Ok(Self {
            conn: db::open_memory()?,
        })
    }
}

impl RecordStore for SqliteStore {
    fn create(&self, item: &mut Item) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO items (summary, owner, state) VALUES (?1, ?2, ?3)",
            rusqlite::params![item.summary, item.owner(), item.state],
        )?;
        let id = self.conn.last_insert_rowid();
        item.id = Some(id);
        Ok(id)
    }

    fn read(&self, id: i64) -> Result<Option<Item>> {
        let item = self
            .conn
            .query_row(&format!("{ITEM_COLUMNS} WHERE id = ?1"), [id], item_from_row)
            .optional()?;
        Ok(item)
    }

    fn read_all(&self) -> Result<Vec<Item>> {
        let mut stmt = self.conn.prepare(&format!("{ITEM_COLUMNS} ORDER BY id"))?;
        let rows = stmt.query_map([], item_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn update(&self, id: i64, fields: &[(Field, String)]) -> Result<usize> {
        if fields.is_empty() {
            let count: i64 =
                self.conn
                    .query_row("SELECT COUNT(*) FROM items WHERE id = ?1", [id], |row| {
                        row.get(0)
                    })?;
            return Ok(count as usize);
        }

        let assignments: Vec<String> = fields
            .iter()
            .enumerate()
            .map(|(i, (field, _))| format!("{} = ?{}", field.column(), i + 1))
            .collect();
        let sql = format!(
            "UPDATE items SET {} WHERE id = ?{}",
            assignments.join(", "),
            fields.len() + 1
        );
        let mut values: Vec<&dyn ToSql> = fields.iter().map(|(_, v)| v as &dyn ToSql).collect();
        values.push(&id);
        Ok(self.conn.execute(&sql, values.as_slice())?)
    }

    fn delete(&self, id: i64) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM items WHERE id = ?1", [id])?)
    }

    fn delete_all(&self) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM items", [])?)
    }

    fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| e.into())
    }
}

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::repo::ItemsDb;

pub const DB_DIR_ENV: &str = "ITEMS_DB_DIR";

/// Where the item database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_dir: PathBuf,
}

impl Config {
    pub fn new(db_dir: impl Into<PathBuf>) -> Self {
        Self {
            db_dir: db_dir.into(),
        }
    }

    /// Use `explicit` when it is non-empty, otherwise `$HOME/items_db`.
    pub fn resolve(explicit: Option<&str>) -> Result<Self> {
        match explicit.filter(|p| !p.is_empty()) {
            Some(p) => Ok(Self::new(p)),
            None => default_db_dir().map(Self::new),
        }
    }

    pub fn open(&self) -> Result<ItemsDb> {
        log::debug!("opening item database in {}", self.db_dir.display());
        ItemsDb::open(&self.db_dir)
            .with_context(|| format!("failed to open item database in {}", self.db_dir.display()))
    }

    /// Open the database, run `f`, and close it again whether or not `f`
    /// succeeded. An error from `f` wins over an error from closing.
    pub fn with_db<T>(&self, f: impl FnOnce(&ItemsDb) -> Result<T>) -> Result<T> {
        let db = self.open()?;
        let result = f(&db);
        let closed = db.close().context("failed to close item database");
        match (result, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Err(close_err)) => {
                log::warn!("{close_err:#}");
                Err(e)
            }
            (Err(e), Ok(())) => Err(e),
        }
    }
}

fn default_db_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join("items_db"))
}

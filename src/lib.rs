pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod output;
pub mod repo;
pub mod server;
pub mod store;

pub use config::Config;
pub use error::{ItemsError, Result};
pub use model::{Item, ItemPatch, State};
pub use repo::ItemsDb;
pub use store::{RecordStore, SqliteStore};

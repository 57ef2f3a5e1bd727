use thiserror::Error;

pub type Result<T> = std::result::Result<T, ItemsError>;

#[derive(Debug, Error)]
pub enum ItemsError {
    /// A new item or a patch carried an empty summary. Nothing was written.
    #[error("missing summary")]
    MissingSummary,

    /// No stored item has this id.
    #[error("invalid item id {0}")]
    InvalidItemId(i64),

    #[error("storage error")]
    Storage(#[from] rusqlite::Error),

    #[error("io error")]
    Io(#[from] std::io::Error),
}

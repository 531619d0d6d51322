use std::path::PathBuf;

use thiserror::Error;

/// Errors emitted by storage adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The file, workbook or database could not be opened or written.
    #[error("storage unavailable at {path}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A persisted record is malformed or misses a field.
    #[error("format error: {0}")]
    Format(String),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("spreadsheet error: {0}")]
    Spreadsheet(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Unavailable {
            path: path.into(),
            source,
        }
    }
}

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PocketbookError {
    #[error("Workbook error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("No transactions parsed from {origin} ({skipped} lines skipped)")]
    NoTransactions { origin: String, skipped: usize },

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, PocketbookError>;

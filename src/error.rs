//! Error types for dbterminal.

use thiserror::Error;

/// Main error type for session and state operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Error reported by SQLite
    #[error("{0}")]
    Sql(#[from] rusqlite::Error),

    /// I/O error (state files, output stream)
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// A connection refused to close cleanly
    #[error("failed to close {which} database: {source}")]
    Close {
        which: &'static str,
        source: rusqlite::Error,
    },
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

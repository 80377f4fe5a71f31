//! I/O error types.

use thiserror::Error;

/// Result type for I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

/// I/O error types.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Decoding error.
    #[error("decode error: {0}")]
    Decode(#[from] drs4_format::Error),

    /// JSON export error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

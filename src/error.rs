//! Store Errors

use std::io;
use thiserror::Error;

/// Errors returned by store operations
#[derive(Debug, Error)]
pub enum Error {
    /// Key is absent from the store
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// Stored value is not an integer
    #[error("value at key {0} is not an integer")]
    NotAnInteger(String),

    /// Increment or decrement would leave the i64 range
    #[error("integer overflow at key {0}")]
    Overflow(String),

    /// Snapshot could not be encoded or decoded
    #[error("snapshot encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Snapshot file could not be read or written
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True for `KeyNotFound`
    pub fn is_key_not_found(&self) -> bool {
        matches!(self, Error::KeyNotFound(_))
    }
}

//! Error types for IPS decoding and patch application

use thiserror::Error;

/// Result type for IPS operations
pub type Result<T> = std::result::Result<T, Error>;

/// IPS error types
#[derive(Error, Debug)]
pub enum Error {
    /// IO error, including unexpected end-of-stream mid-record
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid IPS magic bytes
    ///
    /// Carries the bytes actually read; zero-filled past the point a
    /// short stream ended.
    #[error("Invalid IPS magic: expected \"PATCH\", got {0:?}")]
    InvalidMagic([u8; 5]),
}

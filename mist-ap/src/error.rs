//! Error types for mist-ap
//!
//! Internal failures are typed here; the sound service turns every one of
//! them into a text reply or a `false`/absent result before it reaches a caller.

use thiserror::Error;

/// Main error type for mist-ap
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP client errors (catalog fetch, range fetch, download)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog page could not be interpreted
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Invalid request
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience Result type using mist-ap Error
pub type Result<T> = std::result::Result<T, Error>;

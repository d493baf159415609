//! Error types for the PysonDB-KV client

use std::io;
use thiserror::Error;

/// Errors that can occur when talking to the PysonDB-KV service
#[derive(Error, Debug)]
pub enum Error {
    /// The server answered with a status other than 200 OK.
    ///
    /// The service reports every failure this way, including missing keys
    /// (404) and rejected credentials (401); the body is whatever text the
    /// server sent back.
    #[error("server returned status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Request could not be built or its payload was not a JSON object
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Network or connection error
    #[error("connection error: {0}")]
    Connection(String),

    /// Request timeout
    #[error("request timeout after {0}ms")]
    Timeout(u64),

    /// Base URL or request URL parsing error
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// TLS setup error
    #[error("TLS error: {0}")]
    Tls(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// The HTTP status code, if this error came from a non-200 response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True if the server answered 404 for this request.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

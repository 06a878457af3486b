//! Error types for the contest server
//!
//! `ContestError` covers everything below the handler boundary.
//! `ApiError` is what a handler returns; it carries the status code the
//! client will see.

use thiserror::Error;

/// Result type alias using ContestError
pub type Result<T> = std::result::Result<T, ContestError>;

/// Unified error type for engine, storage and protocol operations
#[derive(Debug, Error)]
pub enum ContestError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    /// Malformed or oversized request, or the stream ended early
    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Registry Errors
    // -------------------------------------------------------------------------
    #[error("Storage error: {0}")]
    Storage(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Document, workbook or archive encoding failed
    #[error("Format error: {0}")]
    Format(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ContestError {
    fn from(e: serde_json::Error) -> Self {
        ContestError::Serialization(e.to_string())
    }
}

impl From<zip::result::ZipError> for ContestError {
    fn from(e: zip::result::ZipError) -> Self {
        ContestError::Format(e.to_string())
    }
}

/// Failure of a single request, already classified by status code
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing `X-Client-Id`
    #[error("missing X-Client-Id")]
    Unauthorized,

    /// Operation attempted outside its configured window
    #[error("{0}")]
    WindowClosed(String),

    #[error("{0}")]
    UnsupportedMediaType(String),

    /// Payload failed validation (length bounds, malformed body, ...)
    #[error("{0}")]
    Validation(String),

    /// Anything unexpected; the detail is logged, never sent
    #[error("internal error: {0}")]
    Internal(#[from] ContestError),
}

impl ApiError {
    /// HTTP status code for this error
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Unauthorized => 401,
            ApiError::WindowClosed(_) => 403,
            ApiError::UnsupportedMediaType(_) => 415,
            ApiError::Validation(_) => 422,
            ApiError::Internal(_) => 500,
        }
    }

    /// Message placed in the JSON `error` field
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Internal(_) => "Internal Server Error".to_string(),
            other => other.to_string(),
        }
    }
}

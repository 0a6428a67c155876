//! Error types shared across the client core.

use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in session and sync operations.
///
/// Transport and server-reported errors surface to the immediate caller
/// unmodified. Secure-store failures never appear here — the token
/// lifecycle layer absorbs them locally.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or HTTP-level failure, passed through unchanged.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server declined the presented credentials or token.
    #[error("authentication rejected: {0}")]
    AuthenticationRejected(String),

    /// Creation conflict (409) — the resource already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// The requested resource does not exist (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller supplied an invalid argument; rejected before any network
    /// call was issued.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The server response violated the wire contract.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Any other unsuccessful HTTP status.
    #[error("api error (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, or the raw body.
        message: String,
    },

    /// JSON encode/decode failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

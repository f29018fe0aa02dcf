//! Error types for the sync server.

use axum::http::StatusCode;
use kiss_storage::StorageError;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the sync server.
///
/// Sync conflicts are not errors: a stale write is answered with the stored
/// record.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Invalid request format or missing field.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Missing or wrong credential.
    #[error("invalid key")]
    AuthenticationFailed,

    /// The requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The record store failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServerError::InvalidRequest(_)
                | ServerError::AuthenticationFailed
                | ServerError::NotFound(_)
        )
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        matches!(self, ServerError::Storage(_) | ServerError::Internal(_))
    }

    /// Returns the HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::InvalidRequest(_) | ServerError::AuthenticationFailed => {
                StatusCode::BAD_REQUEST
            }
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Storage(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the short message sent to clients.
    ///
    /// Server-side details (paths, I/O errors) are not disclosed.
    pub fn public_message(&self) -> &'static str {
        match self {
            ServerError::InvalidRequest(_) => "invalid request",
            ServerError::AuthenticationFailed => "invalid key",
            ServerError::NotFound(_) => "not found",
            ServerError::Storage(_) => "storage error",
            ServerError::Internal(_) => "internal error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_classification() {
        assert!(ServerError::InvalidRequest("bad".into()).is_client_error());
        assert!(ServerError::AuthenticationFailed.is_client_error());
        assert!(ServerError::NotFound("k".into()).is_client_error());
        assert!(ServerError::Internal("oops".into()).is_server_error());
        assert!(!ServerError::InvalidRequest("bad".into()).is_server_error());
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            ServerError::AuthenticationFailed.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::InvalidRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::NotFound("k".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        let err = ServerError::from(StorageError::from(io));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "storage error");
    }
}

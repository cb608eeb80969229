//! Unified error type for slice operations.
//!
//! Every slice operation resolves to `Result<T, SliceError>`; the same
//! error value is recorded in the slice's state so views can render it
//! after the fact. The variants are owned strings rather than source
//! errors because the value is cloned into state.

use thiserror::Error;

use crate::api::ApiError;
use crate::storage::StorageError;

/// Error payload recorded by a rejected slice operation.
#[derive(Debug, Clone, Error)]
pub enum SliceError {
    /// The backend rejected the operation; carries the server-provided
    /// detail when one was present.
    #[error("{0}")]
    Api(String),

    /// The requested entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The credential refresh failed mid-operation; the session has been
    /// cleared and the user must sign in again.
    #[error("Session expired, please sign in again")]
    SessionExpired,

    /// The operation requires a signed-in user.
    #[error("Not signed in")]
    NotAuthenticated,

    /// Durable local storage failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<ApiError> for SliceError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NotFound(detail) => Self::NotFound(detail),
            ApiError::SessionExpired => Self::SessionExpired,
            ApiError::Storage(e) => Self::Storage(e.to_string()),
            other => Self::Api(other.to_string()),
        }
    }
}

impl From<StorageError> for SliceError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_error_display() {
        let err = SliceError::NotFound("product p-1".to_string());
        assert_eq!(err.to_string(), "Not found: product p-1");

        let err = SliceError::Api("HTTP 400: bad payload".to_string());
        assert_eq!(err.to_string(), "HTTP 400: bad payload");
    }

    #[test]
    fn test_api_error_conversion_preserves_categories() {
        let converted: SliceError = ApiError::SessionExpired.into();
        assert!(matches!(converted, SliceError::SessionExpired));

        let converted: SliceError = ApiError::NotFound("p-9".to_string()).into();
        assert!(matches!(converted, SliceError::NotFound(_)));
    }
}

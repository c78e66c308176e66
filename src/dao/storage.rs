//! Backend-independent storage errors.

use std::error::Error;
use thiserror::Error;

/// Result alias for room store operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Backend-independent failure of the room store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not serve the request.
    #[error("room store unavailable: {message}")]
    Unavailable {
        /// Human-readable summary.
        message: String,
        /// Backend error.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The room record could not be read back while its coordinator was starting.
    #[error("room `{room_id}` could not be loaded: {message}")]
    LoadFailed {
        /// Room being rehydrated.
        room_id: String,
        /// Cause reported by the backend.
        message: String,
    },
}

impl StorageError {
    /// Wrap any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Report that `room_id` could not be rehydrated because of `cause`.
    pub fn load_failed(room_id: &str, cause: &StorageError) -> Self {
        StorageError::LoadFailed {
            room_id: room_id.to_owned(),
            message: cause.to_string(),
        }
    }
}

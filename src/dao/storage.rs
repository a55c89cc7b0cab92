use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
///
/// The booking core treats any of these as "no rows" and degrades to a
/// fallback dataset; the variants exist for logging and the health surface.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be reached or refused the operation.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Human-readable failure summary.
        message: String,
        /// Underlying transport or database error.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The backend answered, but its rows could not be decoded.
    #[error("storage returned malformed rows for `{collection}`: {message}")]
    MalformedRows {
        /// Collection whose rows failed to decode.
        collection: String,
        /// Decoder failure summary.
        message: String,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Construct an error describing rows that could not be decoded.
    pub fn malformed(collection: impl Into<String>, message: impl Into<String>) -> Self {
        StorageError::MalformedRows {
            collection: collection.into(),
            message: message.into(),
        }
    }
}

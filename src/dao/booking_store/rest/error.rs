use reqwest::StatusCode;
use thiserror::Error;

use crate::dao::storage::StorageError;

/// Result alias for REST store operations.
pub type RestResult<T> = Result<T, RestDaoError>;

/// Errors raised while talking to the PostgREST-style backend.
#[derive(Debug, Error)]
pub enum RestDaoError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    ClientBuilder {
        /// Builder failure.
        #[source]
        source: reqwest::Error,
    },
    /// The request never produced a response.
    #[error("request to `{path}` failed")]
    RequestSend {
        /// Request path relative to the base URL.
        path: String,
        /// Transport failure.
        #[source]
        source: reqwest::Error,
    },
    /// The backend answered with a non-success status.
    #[error("request to `{path}` returned status {status}")]
    RequestStatus {
        /// Request path relative to the base URL.
        path: String,
        /// Status code returned by the backend.
        status: StatusCode,
    },
    /// The response body could not be decoded into the expected rows.
    #[error("failed to decode response from `{path}`")]
    DecodeResponse {
        /// Request path relative to the base URL.
        path: String,
        /// Decoder failure.
        #[source]
        source: reqwest::Error,
    },
    /// A timestamp could not be formatted into a query parameter.
    #[error("failed to encode query value for `{path}`")]
    EncodeQuery {
        /// Request path relative to the base URL.
        path: String,
        /// Formatting failure.
        #[source]
        source: time::error::Format,
    },
}

impl From<RestDaoError> for StorageError {
    fn from(err: RestDaoError) -> Self {
        match err {
            RestDaoError::DecodeResponse { path, source } => {
                StorageError::malformed(path, source.to_string())
            }
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}

use super::error_code::{self, PrismErrorCode};

/// Errors raised by backend collaborators (search, embedding, rerank, catalog).
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("{backend} unavailable: {reason}")]
    Unavailable { backend: String, reason: String },

    #[error("{backend} timed out after {elapsed_ms}ms")]
    Timeout { backend: String, elapsed_ms: u64 },

    #[error("{backend} returned a malformed response: {reason}")]
    MalformedResponse { backend: String, reason: String },

    #[error("{backend} request failed: {reason}")]
    RequestFailed { backend: String, reason: String },
}

impl BackendError {
    /// Name of the backend that raised the error.
    pub fn backend(&self) -> &str {
        match self {
            Self::Unavailable { backend, .. }
            | Self::Timeout { backend, .. }
            | Self::MalformedResponse { backend, .. }
            | Self::RequestFailed { backend, .. } => backend,
        }
    }
}

impl PrismErrorCode for BackendError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable { .. } => error_code::BACKEND_UNAVAILABLE,
            Self::Timeout { .. } => error_code::BACKEND_TIMEOUT,
            Self::MalformedResponse { .. } => error_code::BACKEND_MALFORMED_RESPONSE,
            Self::RequestFailed { .. } => error_code::BACKEND_REQUEST_FAILED,
        }
    }
}

//! Error handling for Prism.
//! One error enum per subsystem, `thiserror` only, aggregated into `PrismError`.

pub mod backend_error;
pub mod config_error;
pub mod error_code;
pub mod retrieval_error;

pub use backend_error::BackendError;
pub use config_error::ConfigError;
pub use error_code::PrismErrorCode;
pub use retrieval_error::RetrievalError;

/// Top-level error type. Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum PrismError {
    #[error("retrieval error: {0}")]
    RetrievalError(#[from] RetrievalError),

    #[error("backend error: {0}")]
    BackendError(#[from] BackendError),

    #[error("configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl PrismErrorCode for PrismError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::RetrievalError(e) => e.error_code(),
            Self::BackendError(e) => e.error_code(),
            Self::ConfigError(e) => e.error_code(),
            Self::SerializationError(_) => error_code::SERIALIZATION_FAILED,
        }
    }
}

pub type PrismResult<T> = Result<T, PrismError>;

use super::error_code::{self, PrismErrorCode};

/// Retrieval pipeline errors.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("retrieval unavailable: all {} signals failed: {}", failures.len(), failures.join("; "))]
    AllSignalsFailed { failures: Vec<String> },

    #[error("no retrieval signals configured")]
    NoSignalsConfigured,

    #[error("invalid intent rule {name}: {reason}")]
    InvalidIntentRule { name: String, reason: String },

    #[error("tokenizer unavailable: {reason}")]
    TokenizerUnavailable { reason: String },
}

impl PrismErrorCode for RetrievalError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::AllSignalsFailed { .. } => error_code::ALL_SIGNALS_FAILED,
            Self::NoSignalsConfigured => error_code::NO_SIGNALS_CONFIGURED,
            Self::InvalidIntentRule { .. } => error_code::INVALID_INTENT_RULE,
            Self::TokenizerUnavailable { .. } => error_code::TOKENIZER_UNAVAILABLE,
        }
    }
}

//! Stable, machine-readable error codes for transport layers.

pub const ALL_SIGNALS_FAILED: &str = "ALL_SIGNALS_FAILED";
pub const NO_SIGNALS_CONFIGURED: &str = "NO_SIGNALS_CONFIGURED";
pub const INVALID_INTENT_RULE: &str = "INVALID_INTENT_RULE";
pub const TOKENIZER_UNAVAILABLE: &str = "TOKENIZER_UNAVAILABLE";
pub const BACKEND_UNAVAILABLE: &str = "BACKEND_UNAVAILABLE";
pub const BACKEND_TIMEOUT: &str = "BACKEND_TIMEOUT";
pub const BACKEND_MALFORMED_RESPONSE: &str = "BACKEND_MALFORMED_RESPONSE";
pub const BACKEND_REQUEST_FAILED: &str = "BACKEND_REQUEST_FAILED";
pub const CONFIG_PARSE_ERROR: &str = "CONFIG_PARSE_ERROR";
pub const CONFIG_FILE_NOT_FOUND: &str = "CONFIG_FILE_NOT_FOUND";
pub const CONFIG_VALIDATION_FAILED: &str = "CONFIG_VALIDATION_FAILED";
pub const SERIALIZATION_FAILED: &str = "SERIALIZATION_FAILED";

/// Maps an error to its stable code.
pub trait PrismErrorCode {
    fn error_code(&self) -> &'static str;
}

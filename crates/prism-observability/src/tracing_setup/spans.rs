//! Span definitions for the retrieval pipeline.

/// Span covering one `retrieve` call.
#[macro_export]
macro_rules! retrieval_span {
    ($request_id:expr, $query:expr) => {
        tracing::info_span!("prism.retrieval", request_id = %$request_id, query = %$query)
    };
}

/// Span covering one signal branch of the fan-out.
#[macro_export]
macro_rules! signal_span {
    ($signal:expr) => {
        tracing::debug_span!("prism.signal", signal = %$signal)
    };
}

/// Span covering the rerank call.
#[macro_export]
macro_rules! rerank_span {
    ($candidates:expr) => {
        tracing::debug_span!("prism.rerank", candidates = $candidates)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const RETRIEVAL: &str = "prism.retrieval";
    pub const SIGNAL: &str = "prism.signal";
    pub const RERANK: &str = "prism.rerank";
}

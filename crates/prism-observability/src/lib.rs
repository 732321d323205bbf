//! # prism-observability
//!
//! Structured tracing setup with span and event definitions, a bounded query
//! log with latency percentiles and SLO breach counts, and degradation
//! tracking for signals that fail or fall back.

pub mod degradation;
pub mod query_log;
pub mod tracing_setup;

pub use degradation::{ComponentHealth, DegradationEvent, DegradationTracker};
pub use query_log::{QueryLog, QueryLogEntry, QueryLogSummary};

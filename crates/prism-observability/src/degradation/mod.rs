//! Degradation tracking for failed signals and fallbacks.

pub mod tracker;

pub use tracker::{ComponentHealth, DegradationEvent, DegradationTracker};

//! # prism-core
//!
//! Foundation crate for the Prism hybrid retrieval engine.
//! Defines request/response types, backend collaborator traits, errors,
//! config, and defaults. Every other crate in the workspace depends on this.

pub mod config;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::RetrieverConfig;
pub use errors::{PrismError, PrismResult};
pub use models::{
    IntentRule, Metadata, OntologyTerm, RetrievalRequest, RetrievalResponse, RetrievalResult,
    RetrieverScores, RetrieverTiming, SearchHit, Signal,
};

//! Request, result, and response types shared across the workspace.

pub mod hit;
pub mod intent_rule;
pub mod ontology;
pub mod request;
pub mod response;
pub mod result;

pub use hit::SearchHit;
pub use intent_rule::IntentRule;
pub use ontology::OntologyTerm;
pub use request::{NormalizedRequest, RetrievalRequest};
pub use response::{ApiResponse, QueryMeta, RetrievalResponse, RetrieverTiming};
pub use result::{metadata_keys, Metadata, RetrievalResult, RetrieverScores, Signal};

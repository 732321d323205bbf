use async_trait::async_trait;

use crate::errors::PrismResult;
use crate::models::OntologyTerm;

/// Concept catalog used for ontology-based query expansion.
#[async_trait]
pub trait IConceptCatalog: Send + Sync {
    /// Synonyms for a structured identifier (e.g. a trial registry ID).
    async fn synonyms(&self, id: &str) -> PrismResult<Vec<OntologyTerm>>;

    /// Free-text concept search.
    async fn search(&self, text: &str) -> PrismResult<Vec<OntologyTerm>>;
}

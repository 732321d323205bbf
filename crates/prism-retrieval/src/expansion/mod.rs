//! Ontology-based query expansion.
//!
//! Identifier-shaped tokens go to `IConceptCatalog::synonyms`, content tokens
//! to `IConceptCatalog::search`. All lookups for one query run concurrently.
//! Duplicate terms keep their highest weight. Expansion is best-effort: a
//! failing lookup is logged and skipped, and the result records which tokens
//! failed so callers can avoid caching a partial expansion.

pub mod tokens;

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;

use prism_core::models::OntologyTerm;
use prism_core::traits::IConceptCatalog;
use prism_observability::tracing_setup::events;

use tokens::TokenLookup;

/// Terms gathered for one query, plus the tokens whose lookup failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expansion {
    pub terms: BTreeMap<String, f64>,
    pub failed_lookups: Vec<String>,
}

impl Expansion {
    /// True when every lookup answered.
    pub fn is_complete(&self) -> bool {
        self.failed_lookups.is_empty()
    }
}

#[derive(Clone, Default)]
pub struct OntologyExpander {
    catalog: Option<Arc<dyn IConceptCatalog>>,
}

impl OntologyExpander {
    pub fn new(catalog: Option<Arc<dyn IConceptCatalog>>) -> Self {
        Self { catalog }
    }

    pub fn is_enabled(&self) -> bool {
        self.catalog.is_some()
    }

    /// Weighted expansion terms for `query`.
    pub async fn expand(&self, query: &str) -> Expansion {
        let Some(catalog) = &self.catalog else {
            return Expansion::default();
        };
        if query.trim().is_empty() {
            return Expansion::default();
        }

        let lookups = tokens::lookups(query);
        let calls = lookups.iter().map(|lookup| {
            let catalog = Arc::clone(catalog);
            async move {
                match lookup {
                    TokenLookup::Identifier(id) => catalog.synonyms(id).await,
                    TokenLookup::Content(text) => catalog.search(text).await,
                }
            }
        });
        let responses = join_all(calls).await;

        let mut expansion = Expansion::default();
        for (lookup, response) in lookups.iter().zip(responses) {
            match response {
                Ok(terms) => merge_terms(&mut expansion.terms, terms),
                Err(e) => {
                    let token = match lookup {
                        TokenLookup::Identifier(t) | TokenLookup::Content(t) => t,
                    };
                    events::expansion_failed(token, &e.to_string());
                    expansion.failed_lookups.push(token.clone());
                }
            }
        }

        tracing::debug!(
            lookups = lookups.len(),
            terms = expansion.terms.len(),
            failed = expansion.failed_lookups.len(),
            "query expanded"
        );
        expansion
    }
}

/// Fold `terms` into `into`, keeping the maximum weight per term.
pub fn merge_terms(into: &mut BTreeMap<String, f64>, terms: Vec<OntologyTerm>) {
    for OntologyTerm { term, weight } in terms {
        let term = term.trim();
        if term.is_empty() || !weight.is_finite() {
            continue;
        }
        into.entry(term.to_string())
            .and_modify(|w| *w = w.max(weight))
            .or_insert(weight);
    }
}

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::PrismResult;
use crate::models::SearchHit;

/// Lexical (BM25) search over a named index.
///
/// The sparse and graph-granularity signals are also served through this
/// trait, each against its own index with its own query body.
#[async_trait]
pub trait ILexicalSearch: Send + Sync {
    /// Run `body` against `index`, returning at most `size` hits sorted by
    /// descending score.
    async fn search(&self, index: &str, body: &Value, size: usize) -> PrismResult<Vec<SearchHit>>;
}

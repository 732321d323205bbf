use serde::{Deserialize, Serialize};

use super::defaults;

/// Adjacent-chunk consolidation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeighborMergeConfig {
    /// Minimum adjacency similarity (`metadata["cosine"]`) for a chunk to merge.
    pub min_cosine: f64,
    /// Token budget for one merged result.
    pub max_tokens: usize,
    /// Joins the texts of a merged run.
    pub separator: String,
}

impl Default for NeighborMergeConfig {
    fn default() -> Self {
        Self {
            min_cosine: defaults::DEFAULT_MIN_COSINE,
            max_tokens: defaults::DEFAULT_MAX_MERGE_TOKENS,
            separator: defaults::DEFAULT_MERGE_SEPARATOR.to_string(),
        }
    }
}

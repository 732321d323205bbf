use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Graph-granularity search over additional indexes.
///
/// `indexes` maps a granularity label (`paragraph`, `section`, `graph`, ...)
/// to the index holding chunks at that level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiGranularityConfig {
    pub enabled: bool,
    pub indexes: BTreeMap<String, String>,
}

impl Default for MultiGranularityConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::DEFAULT_MULTI_GRANULARITY_ENABLED,
            indexes: BTreeMap::new(),
        }
    }
}

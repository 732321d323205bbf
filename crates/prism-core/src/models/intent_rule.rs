use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named intent: ordered keyword patterns plus the field boosts and filters
/// applied when the intent is selected.
///
/// Patterns are case-insensitive regular expressions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentRule {
    pub name: String,
    pub patterns: Vec<String>,
    #[serde(default)]
    pub boosts: BTreeMap<String, f64>,
    #[serde(default)]
    pub filters: BTreeMap<String, Value>,
}

impl IntentRule {
    pub fn new<I, S>(name: impl Into<String>, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            patterns: patterns.into_iter().map(Into::into).collect(),
            boosts: BTreeMap::new(),
            filters: BTreeMap::new(),
        }
    }

    pub fn with_boost(mut self, field: impl Into<String>, boost: f64) -> Self {
        self.boosts.insert(field.into(), boost);
        self
    }

    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }
}

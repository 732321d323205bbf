//! Query intent classification over ordered, case-insensitive regex rules.
//!
//! Rules are scanned in order and the first rule with a matching pattern wins.
//! The last rule must be a catch-all, which makes `detect` total.

pub mod rules;

use std::collections::BTreeMap;

use regex::{Regex, RegexBuilder};
use serde_json::Value;

use prism_core::config::RetrieverConfig;
use prism_core::errors::{PrismResult, RetrievalError};
use prism_core::models::IntentRule;

pub use rules::default_rules;

/// Probe used to check that the last rule matches arbitrary non-empty text.
const CATCH_ALL_PROBE: &str = "catch-all probe 0042 ZZ";

/// Boosts and filters contributed by the resolved intent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntentContext {
    pub boosts: BTreeMap<String, f64>,
    pub filters: BTreeMap<String, Value>,
}

struct CompiledRule {
    rule: IntentRule,
    patterns: Vec<Regex>,
}

impl CompiledRule {
    fn matches(&self, query: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(query))
    }
}

pub struct IntentClassifier {
    rules: Vec<CompiledRule>,
}

impl IntentClassifier {
    /// Compile `rules`. Fails when the list is empty, a rule has no patterns,
    /// a name repeats, a pattern does not compile, or the last rule is not a
    /// catch-all.
    pub fn new(rules: Vec<IntentRule>) -> PrismResult<Self> {
        let Some(last) = rules.last() else {
            return Err(invalid_rule("<none>", "at least one intent rule is required"));
        };
        let last_name = last.name.clone();

        let mut compiled: Vec<CompiledRule> = Vec::with_capacity(rules.len());
        for rule in rules {
            if rule.name.trim().is_empty() {
                return Err(invalid_rule(&rule.name, "rule name must not be blank"));
            }
            if compiled.iter().any(|c| c.rule.name == rule.name) {
                return Err(invalid_rule(&rule.name, "duplicate rule name"));
            }
            if rule.patterns.is_empty() {
                return Err(invalid_rule(&rule.name, "rule has no patterns"));
            }
            let patterns = rule
                .patterns
                .iter()
                .map(|p| {
                    RegexBuilder::new(p)
                        .case_insensitive(true)
                        .build()
                        .map_err(|e| invalid_rule(&rule.name, &e.to_string()))
                })
                .collect::<PrismResult<Vec<_>>>()?;
            compiled.push(CompiledRule { rule, patterns });
        }

        let catch_all = compiled
            .last()
            .is_some_and(|c| c.matches("") && c.matches(CATCH_ALL_PROBE));
        if !catch_all {
            return Err(invalid_rule(
                &last_name,
                "the last rule must be a catch-all matching every query",
            ));
        }

        tracing::debug!(rules = compiled.len(), "intent classifier compiled");
        Ok(Self { rules: compiled })
    }

    /// Rules from `config.intent_rules`, or the built-in set.
    pub fn from_config(config: &RetrieverConfig) -> PrismResult<Self> {
        match &config.intent_rules {
            Some(rules) => Self::new(rules.clone()),
            None => Self::new(default_rules()),
        }
    }

    /// Name of the first rule matching `query`.
    pub fn detect(&self, query: &str) -> &str {
        self.rules
            .iter()
            .find(|c| c.matches(query))
            .or(self.rules.last())
            .map(|c| c.rule.name.as_str())
            .unwrap_or(rules::GENERAL)
    }

    /// Boosts and filters of the named intent. Unknown names yield empty maps.
    pub fn context_for(&self, intent: &str) -> IntentContext {
        self.rules
            .iter()
            .find(|c| c.rule.name == intent)
            .map(|c| IntentContext {
                boosts: c.rule.boosts.clone(),
                filters: c.rule.filters.clone(),
            })
            .unwrap_or_default()
    }

    /// Rule names in evaluation order.
    pub fn intents(&self) -> Vec<&str> {
        self.rules.iter().map(|c| c.rule.name.as_str()).collect()
    }
}

fn invalid_rule(name: &str, reason: &str) -> prism_core::PrismError {
    RetrievalError::InvalidIntentRule {
        name: name.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

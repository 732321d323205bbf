//! Per-component degradation state with a bounded event history.
//!
//! A component (a signal, the reranker, query expansion) is healthy until it
//! fails. The first failure opens a degraded episode, later failures extend
//! it, and the next success closes it.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const DEFAULT_HISTORY: usize = 1_000;

/// A component failed and the pipeline continued on a fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradationEvent {
    pub component: String,
    pub failure: String,
    pub fallback_used: String,
    pub timestamp: DateTime<Utc>,
}

impl DegradationEvent {
    pub fn new(
        component: impl Into<String>,
        failure: impl Into<String>,
        fallback_used: impl Into<String>,
    ) -> Self {
        Self {
            component: component.into(),
            failure: failure.into(),
            fallback_used: fallback_used.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Current state of one component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub component: String,
    /// Start of the open episode. `None` while healthy.
    pub degraded_since: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
    pub total_failures: u64,
    pub recoveries: u64,
    pub last_failure: Option<String>,
    pub last_fallback: Option<String>,
    pub last_recovered_at: Option<DateTime<Utc>>,
}

impl ComponentHealth {
    fn new(component: &str) -> Self {
        Self {
            component: component.to_string(),
            degraded_since: None,
            consecutive_failures: 0,
            total_failures: 0,
            recoveries: 0,
            last_failure: None,
            last_fallback: None,
            last_recovered_at: None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded_since.is_some()
    }

    fn fail(&mut self, event: &DegradationEvent) {
        if self.degraded_since.is_none() {
            self.degraded_since = Some(event.timestamp);
        }
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.total_failures = self.total_failures.saturating_add(1);
        self.last_failure = Some(event.failure.clone());
        self.last_fallback = Some(event.fallback_used.clone());
    }
}

#[derive(Debug, Clone)]
pub struct DegradationTracker {
    components: BTreeMap<String, ComponentHealth>,
    history: VecDeque<DegradationEvent>,
    max_events: usize,
}

impl Default for DegradationTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl DegradationTracker {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY)
    }

    /// Keep at most `max_events` events in the history. Component state is
    /// never trimmed.
    pub fn with_capacity(max_events: usize) -> Self {
        Self {
            components: BTreeMap::new(),
            history: VecDeque::new(),
            max_events: max_events.max(1),
        }
    }

    pub fn record(&mut self, event: DegradationEvent) {
        crate::tracing_setup::events::degradation_triggered(
            &event.component,
            &event.failure,
            &event.fallback_used,
        );
        self.components
            .entry(event.component.clone())
            .or_insert_with(|| ComponentHealth::new(&event.component))
            .fail(&event);

        self.history.push_back(event);
        while self.history.len() > self.max_events {
            self.history.pop_front();
        }
    }

    /// Close the open episode for `component`. Returns `false` when the
    /// component was not degraded.
    pub fn mark_recovered(&mut self, component: &str) -> bool {
        let Some(health) = self.components.get_mut(component) else {
            return false;
        };
        let Some(since) = health.degraded_since.take() else {
            return false;
        };
        let now = Utc::now();
        health.consecutive_failures = 0;
        health.recoveries = health.recoveries.saturating_add(1);
        health.last_recovered_at = Some(now);
        tracing::info!(
            event = "degradation_recovered",
            component = %component,
            degraded_ms = (now - since).num_milliseconds(),
            "component recovered"
        );
        true
    }

    pub fn health(&self, component: &str) -> Option<&ComponentHealth> {
        self.components.get(component)
    }

    /// Every component that has failed at least once, by name.
    pub fn components(&self) -> impl Iterator<Item = &ComponentHealth> {
        self.components.values()
    }

    /// Recorded events, oldest first.
    pub fn events(&self) -> &VecDeque<DegradationEvent> {
        &self.history
    }

    /// Components with an open episode, sorted.
    pub fn active_components(&self) -> Vec<String> {
        self.components
            .values()
            .filter(|h| h.is_degraded())
            .map(|h| h.component.clone())
            .collect()
    }

    pub fn is_degraded(&self, component: &str) -> bool {
        self.health(component).is_some_and(ComponentHealth::is_degraded)
    }

    /// Events for `component` in the last `window_secs` seconds.
    pub fn count_recent(&self, component: &str, window_secs: i64) -> usize {
        let cutoff = Utc::now() - chrono::Duration::seconds(window_secs);
        self.history
            .iter()
            .rev()
            .take_while(|e| e.timestamp > cutoff)
            .filter(|e| e.component == component)
            .count()
    }
}

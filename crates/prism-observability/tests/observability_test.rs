use std::time::Duration;

use prism_observability::degradation::{DegradationEvent, DegradationTracker};
use prism_observability::query_log::{QueryLog, QueryLogEntry};
use prism_observability::tracing_setup::spans::names;

#[test]
fn tracker_records_and_recovers() {
    let mut tracker = DegradationTracker::new();
    tracker.record(DegradationEvent::new("dense", "timeout", "remaining signals"));
    tracker.record(DegradationEvent::new("reranker", "unavailable", "fused order"));
    tracker.record(DegradationEvent::new("dense", "refused", "remaining signals"));

    assert!(tracker.is_degraded("dense"));
    assert_eq!(tracker.active_components(), vec!["dense", "reranker"]);
    assert_eq!(tracker.count_recent("dense", 60), 2);

    let dense = tracker.health("dense").unwrap();
    assert_eq!(dense.consecutive_failures, 2);
    assert_eq!(dense.last_failure.as_deref(), Some("refused"));
    assert_eq!(dense.degraded_since, Some(tracker.events()[0].timestamp));

    assert!(tracker.mark_recovered("dense"));
    assert!(!tracker.is_degraded("dense"));
    assert_eq!(tracker.active_components(), vec!["reranker"]);
    let dense = tracker.health("dense").unwrap();
    assert_eq!(dense.consecutive_failures, 0);
    assert_eq!(dense.total_failures, 2);
    assert_eq!(dense.recoveries, 1);
    assert!(dense.last_recovered_at.is_some());

    // Nothing left to recover.
    assert!(!tracker.mark_recovered("dense"));
    assert!(!tracker.mark_recovered("splade"));
}

#[test]
fn failure_after_recovery_opens_a_new_episode() {
    let mut tracker = DegradationTracker::new();
    tracker.record(DegradationEvent::new("expansion", "lookup failed", "partial terms"));
    tracker.mark_recovered("expansion");
    tracker.record(DegradationEvent::new("expansion", "lookup failed", "partial terms"));

    let health = tracker.health("expansion").unwrap();
    assert!(health.is_degraded());
    assert_eq!(health.consecutive_failures, 1);
    assert_eq!(health.total_failures, 2);
    assert_eq!(health.degraded_since, Some(tracker.events()[1].timestamp));
    assert_eq!(tracker.components().count(), 1);
}

#[test]
fn tracker_history_is_bounded_but_state_is_kept() {
    let mut tracker = DegradationTracker::with_capacity(2);
    for component in ["bm25", "splade", "dense"] {
        tracker.record(DegradationEvent::new(component, "down", "none"));
    }
    assert_eq!(tracker.events().len(), 2);
    assert_eq!(tracker.events()[0].component, "splade");
    assert_eq!(tracker.count_recent("bm25", 60), 0);
    assert!(tracker.is_degraded("bm25"));
    assert_eq!(tracker.active_components(), vec!["bm25", "dense", "splade"]);
}

#[test]
fn query_log_summary_counts_breaches_and_cache_hits() {
    let mut log = QueryLog::with_capacity(100);
    log.record(QueryLogEntry::new("a", "general", Duration::from_millis(100), 5));
    log.record(
        QueryLogEntry::new("b", "dosing", Duration::from_millis(900), 2).with_slo_breached(true),
    );
    log.record(
        QueryLogEntry::new("a", "general", Duration::from_millis(2), 5).with_cache_hit(true),
    );

    let summary = log.summary();
    assert_eq!(summary.count, 3);
    assert_eq!(summary.slo_breaches, 1);
    assert_eq!(summary.cache_hits, 1);
    assert_eq!(summary.p50_latency_ms, 100.0);
    assert_eq!(summary.p95_latency_ms, 900.0);
}

#[test]
fn entries_serialize() {
    let entry = QueryLogEntry::new("q", "general", Duration::from_millis(5), 1)
        .with_failed_signals(vec!["splade".into()]);
    let value = serde_json::to_value(&entry).unwrap();
    assert_eq!(value["failed_signals"][0], "splade");
    assert_eq!(value["intent"], "general");
}

#[test]
fn span_names_are_namespaced() {
    assert!(names::RETRIEVAL.starts_with("prism."));
    assert!(names::SIGNAL.starts_with("prism."));
}

#[test]
fn init_tracing_is_idempotent() {
    let _ = prism_observability::tracing_setup::init_tracing_with_filter("warn");
    assert!(!prism_observability::tracing_setup::init_tracing_with_filter("warn"));
}

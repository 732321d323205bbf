//! Per-request query log: query text, intent, latency, result count, cache hit, SLO status.

use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A single query log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryLogEntry {
    pub query: String,
    pub intent: String,
    pub latency: Duration,
    pub result_count: usize,
    pub cache_hit: bool,
    pub slo_breached: bool,
    pub failed_signals: Vec<String>,
    pub timestamp_epoch_ms: i64,
}

impl QueryLogEntry {
    /// Create an entry timestamped now.
    pub fn new(
        query: impl Into<String>,
        intent: impl Into<String>,
        latency: Duration,
        result_count: usize,
    ) -> Self {
        Self {
            query: query.into(),
            intent: intent.into(),
            latency,
            result_count,
            cache_hit: false,
            slo_breached: false,
            failed_signals: Vec::new(),
            timestamp_epoch_ms: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn with_cache_hit(mut self, cache_hit: bool) -> Self {
        self.cache_hit = cache_hit;
        self
    }

    pub fn with_slo_breached(mut self, breached: bool) -> Self {
        self.slo_breached = breached;
        self
    }

    pub fn with_failed_signals(mut self, failed: Vec<String>) -> Self {
        self.failed_signals = failed;
        self
    }
}

/// Aggregate view of the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryLogSummary {
    pub count: usize,
    pub avg_latency_ms: f64,
    pub p50_latency_ms: f64,
    pub p95_latency_ms: f64,
    pub slo_breaches: usize,
    pub cache_hits: usize,
}

/// Bounded query log. The oldest entries are dropped once `max_entries` is reached.
#[derive(Debug, Clone)]
pub struct QueryLog {
    entries: VecDeque<QueryLogEntry>,
    max_entries: usize,
}

impl Default for QueryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryLog {
    pub fn new() -> Self {
        Self::with_capacity(10_000)
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries: max_entries.max(1),
        }
    }

    pub fn record(&mut self, entry: QueryLogEntry) {
        tracing::debug!(
            event = "query_logged",
            query = %entry.query,
            intent = %entry.intent,
            latency_ms = entry.latency.as_millis() as u64,
            result_count = entry.result_count,
            cache_hit = entry.cache_hit,
            slo_breached = entry.slo_breached,
            "query logged"
        );

        self.entries.push_back(entry);
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &QueryLogEntry> {
        self.entries.iter()
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn avg_latency(&self) -> Duration {
        if self.entries.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.entries.iter().map(|e| e.latency).sum();
        total / self.entries.len() as u32
    }

    /// Latency at the given percentile (0.0–1.0).
    pub fn latency_percentile(&self, p: f64) -> Duration {
        if self.entries.is_empty() {
            return Duration::ZERO;
        }
        let mut latencies: Vec<Duration> = self.entries.iter().map(|e| e.latency).collect();
        latencies.sort();
        let p = p.clamp(0.0, 1.0);
        let idx = ((p * (latencies.len() - 1) as f64).round() as usize).min(latencies.len() - 1);
        latencies[idx]
    }

    pub fn slo_breaches(&self) -> usize {
        self.entries.iter().filter(|e| e.slo_breached).count()
    }

    pub fn summary(&self) -> QueryLogSummary {
        QueryLogSummary {
            count: self.count(),
            avg_latency_ms: duration_ms(self.avg_latency()),
            p50_latency_ms: duration_ms(self.latency_percentile(0.5)),
            p95_latency_ms: duration_ms(self.latency_percentile(0.95)),
            slo_breaches: self.slo_breaches(),
            cache_hits: self.entries.iter().filter(|e| e.cache_hit).count(),
        }
    }
}

fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ms: u64) -> QueryLogEntry {
        QueryLogEntry::new("q", "general", Duration::from_millis(ms), 3)
    }

    #[test]
    fn ring_drops_oldest() {
        let mut log = QueryLog::with_capacity(3);
        for ms in [10, 20, 30, 40] {
            log.record(entry(ms));
        }
        assert_eq!(log.count(), 3);
        let first = log.entries().next().unwrap();
        assert_eq!(first.latency, Duration::from_millis(20));
    }

    #[test]
    fn percentiles_on_sorted_latencies() {
        let mut log = QueryLog::new();
        for ms in [50, 10, 30, 20, 40] {
            log.record(entry(ms));
        }
        assert_eq!(log.avg_latency(), Duration::from_millis(30));
        assert_eq!(log.latency_percentile(0.0), Duration::from_millis(10));
        assert_eq!(log.latency_percentile(0.5), Duration::from_millis(30));
        assert_eq!(log.latency_percentile(1.0), Duration::from_millis(50));
    }

    #[test]
    fn empty_log_reports_zero() {
        let log = QueryLog::new();
        assert_eq!(log.avg_latency(), Duration::ZERO);
        assert_eq!(log.latency_percentile(0.95), Duration::ZERO);
        assert_eq!(log.summary().count, 0);
    }
}

use std::collections::HashSet;

use prism_core::models::{RetrievalResult, SearchHit, Signal};

use super::hits::hit_to_result;

/// Results of one signal, ranked by descending raw score.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalPool {
    pub signal: Signal,
    pub results: Vec<RetrievalResult>,
}

impl SignalPool {
    /// Rank `results` by their `signal` score. Ties keep input order and a
    /// repeated `chunk_id` keeps only its best-ranked entry.
    pub fn new(signal: Signal, mut results: Vec<RetrievalResult>) -> Self {
        results.sort_by(|a, b| raw(b, signal).total_cmp(&raw(a, signal)));
        let mut seen = HashSet::new();
        results.retain(|r| seen.insert(r.chunk_id.clone()));
        Self { signal, results }
    }

    pub fn from_hits(signal: Signal, hits: Vec<SearchHit>) -> Self {
        Self::new(
            signal,
            hits.into_iter().map(|h| hit_to_result(h, signal)).collect(),
        )
    }

    pub fn empty(signal: Signal) -> Self {
        Self {
            signal,
            results: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// `(chunk_id, raw score)` in rank order.
    pub fn scored(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.results
            .iter()
            .map(|r| (r.chunk_id.as_str(), raw(r, self.signal)))
    }
}

fn raw(result: &RetrievalResult, signal: Signal) -> f64 {
    result.scores.signal(signal).unwrap_or(result.score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_and_dedupes() {
        let pool = SignalPool::from_hits(
            Signal::Bm25,
            vec![
                SearchHit::new("a", 1.0),
                SearchHit::new("b", 3.0),
                SearchHit::new("a", 2.0),
            ],
        );
        let ids: Vec<&str> = pool.scored().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(pool.results[1].scores.bm25, Some(2.0));
    }
}

//! Per-result fusion explanations (`metadata["explain"]`).

use std::collections::HashMap;

use serde_json::{json, Map, Value};

use crate::search::SignalPool;

use super::FusionMethod;

/// `chunk_id → { fusion, signals: { <signal>: { rank, raw } } }` with 1-indexed ranks.
pub fn explanations(pools: &[SignalPool], method: FusionMethod) -> HashMap<String, Value> {
    let mut signals: HashMap<String, Map<String, Value>> = HashMap::new();
    for pool in pools {
        for (rank, (chunk_id, raw)) in pool.scored().enumerate() {
            signals.entry(chunk_id.to_string()).or_default().insert(
                pool.signal.as_str().to_string(),
                json!({ "rank": rank + 1, "raw": raw }),
            );
        }
    }
    signals
        .into_iter()
        .map(|(chunk_id, per_signal)| {
            let explain = json!({ "fusion": method.as_str(), "signals": per_signal });
            (chunk_id, explain)
        })
        .collect()
}

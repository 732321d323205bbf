//! Mapping raw backend hits into results.

use serde_json::Value;

use prism_core::models::{metadata_keys, RetrievalResult, SearchHit, Signal};

/// Build a result from a backend hit, recording `hit.score` under `signal`.
///
/// `chunk_id` falls back to the hit id. A top-level `cosine` or
/// `relationship` in the source is moved into metadata. Dense hits without an
/// explicit `cosine` use their similarity score as one.
pub fn hit_to_result(hit: SearchHit, signal: Signal) -> RetrievalResult {
    let SearchHit { id, score, source } = hit;
    let str_field = |key: &str| source.get(key).and_then(Value::as_str).map(str::to_string);
    let u64_field = |key: &str| source.get(key).and_then(Value::as_u64);

    let chunk_id = str_field("chunk_id").unwrap_or_else(|| id.clone());
    let mut result = RetrievalResult::new(
        chunk_id,
        str_field("doc_id").unwrap_or_default(),
        str_field("text").unwrap_or_default(),
    )
    .with_signal(signal, score);
    result.title_path = str_field("title_path");
    result.section = str_field("section");
    result.start = u64_field("start");
    result.end = u64_field("end");

    if let Some(Value::Object(metadata)) = source.get("metadata") {
        result.metadata = metadata.clone();
    }
    for key in [metadata_keys::COSINE, metadata_keys::RELATIONSHIP] {
        if let Some(value) = source.get(key) {
            result.metadata.insert(key.to_string(), value.clone());
        }
    }
    if signal == Signal::Dense && !result.metadata.contains_key(metadata_keys::COSINE) {
        result
            .metadata
            .insert(metadata_keys::COSINE.to_string(), Value::from(score));
    }
    result
}

//! Cache keys are blake3 content hashes.

use serde::Serialize;

use prism_core::PrismResult;

/// Hex blake3 hash of `content`.
pub fn content_key(content: &str) -> String {
    blake3::hash(content.as_bytes()).to_hex().to_string()
}

/// Hex blake3 hash of a value's JSON serialization.
pub fn json_key<T: Serialize>(value: &T) -> PrismResult<String> {
    let bytes = serde_json::to_vec(value)?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_key_is_stable_hex() {
        let a = content_key("pembrolizumab");
        assert_eq!(a, content_key("pembrolizumab"));
        assert_eq!(a.len(), 64);
        assert_ne!(a, content_key("nivolumab"));
    }

    #[test]
    fn json_key_distinguishes_values() {
        let a = json_key(&serde_json::json!({"query": "a", "top_k": 5})).unwrap();
        let b = json_key(&serde_json::json!({"query": "a", "top_k": 6})).unwrap();
        assert_ne!(a, b);
    }
}

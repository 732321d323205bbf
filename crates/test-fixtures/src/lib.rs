//! Test fixtures for Prism: JSON scenario loading and recording stub backends.

pub mod scenario;
pub mod stubs;

use serde::de::DeserializeOwned;
use std::path::PathBuf;

pub use scenario::RetrievalScenario;

/// Root directory of the test-fixtures folder.
fn fixtures_root() -> PathBuf {
    // Works from any crate in the workspace: walk up to find test-fixtures.
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let mut path = PathBuf::from(&manifest_dir);

    while !path.join("test-fixtures").exists() {
        if !path.pop() {
            panic!(
                "Could not find test-fixtures directory from CARGO_MANIFEST_DIR={}",
                manifest_dir
            );
        }
    }
    path.join("test-fixtures")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

pub fn fixture_exists(relative_path: &str) -> bool {
    fixtures_root().join(relative_path).exists()
}

/// Load a retrieval scenario from `retrieval/<name>.json`.
pub fn load_scenario(name: &str) -> RetrievalScenario {
    load_fixture(&format!("retrieval/{name}.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_root_exists() {
        assert!(fixtures_root().exists(), "test-fixtures directory not found");
    }

    #[test]
    fn retrieval_scenarios_parse() {
        for name in ["pembrolizumab", "overlap_and_neighbors"] {
            assert!(fixture_exists(&format!("retrieval/{name}.json")), "Missing fixture: {name}");
            let scenario = load_scenario(name);
            assert!(!scenario.query.is_empty());
            assert!(!scenario.lexical.is_empty());
        }
    }
}

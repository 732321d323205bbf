//! Retriever configuration, loaded from TOML with compiled defaults.

pub mod cache_config;
pub mod defaults;
pub mod fusion_config;
pub mod granularity_config;
pub mod merge_config;
pub mod retriever_config;

pub use cache_config::CacheConfig;
pub use fusion_config::FusionWeights;
pub use granularity_config::MultiGranularityConfig;
pub use merge_config::NeighborMergeConfig;
pub use retriever_config::RetrieverConfig;

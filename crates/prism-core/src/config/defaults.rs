// Single source of truth for all default values.

// --- Indexes ---
pub const DEFAULT_BM25_INDEX: &str = "chunks_bm25";
pub const DEFAULT_SPLADE_INDEX: &str = "chunks_splade";
pub const DEFAULT_DENSE_INDEX: &str = "chunks_dense";

// --- Pagination ---
pub const DEFAULT_TOP_K: usize = 10;
pub const DEFAULT_MAX_TOP_K: usize = 50;
pub const DEFAULT_CANDIDATE_MULTIPLIER: usize = 3;

// --- Fusion ---
pub const DEFAULT_RRF_K: u32 = 60;
pub const DEFAULT_BM25_WEIGHT: f64 = 0.35;
pub const DEFAULT_SPLADE_WEIGHT: f64 = 0.25;
pub const DEFAULT_DENSE_WEIGHT: f64 = 0.40;
pub const DEFAULT_GRAPH_WEIGHT: f64 = 0.10;

// --- Reranking ---
pub const DEFAULT_RERANK_TOP_N: usize = 20;
pub const DEFAULT_RERANK_ENABLED: bool = false;

// --- Neighbor merge ---
pub const DEFAULT_MIN_COSINE: f64 = 0.85;
pub const DEFAULT_MAX_MERGE_TOKENS: usize = 512;
pub const DEFAULT_MERGE_SEPARATOR: &str = "\n\n";

// --- Caches ---
pub const DEFAULT_QUERY_CACHE_SECONDS: u64 = 60;
pub const DEFAULT_EMBEDDING_CACHE_SECONDS: u64 = 3_600; // 1 hour
pub const DEFAULT_EXPANSION_CACHE_SECONDS: u64 = 600; // 10 minutes
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 10_000;

// --- Latency ---
pub const DEFAULT_SLO_MS: u64 = 800;

// --- Multi-granularity ---
pub const DEFAULT_MULTI_GRANULARITY_ENABLED: bool = false;

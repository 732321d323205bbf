//! Signal search: query bodies, hit mapping, per-signal pools, and branches.

pub mod branches;
pub mod hits;
pub mod pool;
pub mod query_body;

pub use hits::hit_to_result;
pub use pool::SignalPool;
pub use query_body::{lexical_body, sparse_body};

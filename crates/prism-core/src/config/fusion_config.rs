use serde::{Deserialize, Serialize};

use super::defaults;
use crate::models::Signal;

/// Per-signal fusion weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionWeights {
    pub bm25: f64,
    pub splade: f64,
    pub dense: f64,
    pub graph: f64,
}

impl FusionWeights {
    /// All four weights set to zero.
    pub fn zero() -> Self {
        Self {
            bm25: 0.0,
            splade: 0.0,
            dense: 0.0,
            graph: 0.0,
        }
    }

    /// Weight configured for a signal.
    pub fn weight(&self, signal: Signal) -> f64 {
        match signal {
            Signal::Bm25 => self.bm25,
            Signal::Splade => self.splade,
            Signal::Dense => self.dense,
            Signal::Graph => self.graph,
        }
    }
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            bm25: defaults::DEFAULT_BM25_WEIGHT,
            splade: defaults::DEFAULT_SPLADE_WEIGHT,
            dense: defaults::DEFAULT_DENSE_WEIGHT,
            graph: defaults::DEFAULT_GRAPH_WEIGHT,
        }
    }
}

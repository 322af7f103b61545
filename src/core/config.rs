use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    // BM25 weighting used by the leaf matcher
    pub bm25_k1: f64,
    pub bm25_b: f64,

    // Open sub-databases of a multi database on the rayon pool
    pub parallel_open: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bm25_k1: 1.2,
            bm25_b: 0.75,
            parallel_open: true,
        }
    }
}

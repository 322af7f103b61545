use crate::core::types::{DocCount, TermCount, Weight};

/// Collection statistics for one query term
#[derive(Debug, Clone, Default)]
pub struct TermStats {
    pub collection_size: DocCount,  // N
    pub term_freq: DocCount,        // n: documents containing the term
    pub rset_size: DocCount,        // R: documents known relevant
    pub rel_term_freq: DocCount,    // r: relevant documents containing the term
    pub avg_length: f64,
}

impl TermStats {
    /// Robertson/Sparck-Jones relevance weight, shifted to stay positive.
    /// Reduces to the usual BM25 idf when no relevance information is given.
    pub fn idf(&self) -> Weight {
        let n_docs = self.collection_size as f64;
        let n = self.term_freq as f64;
        let big_r = self.rset_size as f64;
        let r = self.rel_term_freq as f64;

        let numerator = (r + 0.5) * (n_docs - n - big_r + r + 0.5);
        let denominator = (n - r + 0.5) * (big_r - r + 0.5);
        (1.0 + (numerator / denominator).max(0.0)).ln()
    }
}

/// Scorer trait
pub trait Scorer: Send + Sync {
    fn score(&self, wdf: TermCount, doc_length: TermCount, stats: &TermStats) -> Weight;

    /// Upper bound of `score` over every document
    fn max_score(&self, stats: &TermStats) -> Weight;

    fn name(&self) -> &str;
}

/// BM25 Scorer
#[derive(Debug, Clone)]
pub struct BM25Scorer {
    pub k1: f64,  // Term frequency saturation (default: 1.2)
    pub b: f64,   // Length normalization strength (default: 0.75)
}

impl BM25Scorer {
    pub fn new(k1: f64, b: f64) -> Self {
        BM25Scorer { k1, b }
    }
}

impl Default for BM25Scorer {
    fn default() -> Self {
        BM25Scorer {
            k1: 1.2,
            b: 0.75,
        }
    }
}

impl Scorer for BM25Scorer {
    fn score(&self, wdf: TermCount, doc_length: TermCount, stats: &TermStats) -> Weight {
        if wdf == 0 {
            return 0.0;
        }
        let tf = wdf as f64;
        let length_ratio = if stats.avg_length > 0.0 {
            doc_length as f64 / stats.avg_length
        } else {
            1.0
        };

        let numerator = stats.idf() * tf * (self.k1 + 1.0);
        let denominator = tf + self.k1 * (1.0 - self.b + self.b * length_ratio);

        numerator / denominator
    }

    fn max_score(&self, stats: &TermStats) -> Weight {
        stats.idf() * (self.k1 + 1.0)
    }

    fn name(&self) -> &str {
        "bm25"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(term_freq: DocCount) -> TermStats {
        TermStats {
            collection_size: 100,
            term_freq,
            rset_size: 0,
            rel_term_freq: 0,
            avg_length: 10.0,
        }
    }

    #[test]
    fn test_idf_favours_rare_terms() {
        assert!(stats(1).idf() > stats(50).idf());
        assert!(stats(100).idf() > 0.0);
    }

    #[test]
    fn test_relevance_raises_idf() {
        let plain = stats(10);
        let relevant = TermStats { rset_size: 2, rel_term_freq: 2, ..stats(10) };
        assert!(relevant.idf() > plain.idf());
    }

    #[test]
    fn test_score_below_bound() {
        let scorer = BM25Scorer::default();
        let s = stats(5);
        for wdf in [1, 2, 10, 1000] {
            for doc_length in [1, 10, 100] {
                let score = scorer.score(wdf, doc_length, &s);
                assert!(score > 0.0);
                assert!(score < scorer.max_score(&s));
            }
        }
        assert_eq!(scorer.score(0, 10, &s), 0.0);
        assert_eq!(scorer.name(), "bm25");
    }

    #[test]
    fn test_longer_documents_score_lower() {
        let scorer = BM25Scorer::default();
        let s = stats(5);
        assert!(scorer.score(2, 5, &s) > scorer.score(2, 50, &s));
    }
}

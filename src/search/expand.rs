use std::cmp::Ordering;
use tracing::debug;
use crate::core::error::Result;
use crate::core::types::{DocCount, TermCount, Weight};
use crate::index::backend::Backend;
use crate::search::decider::ExpandDecider;
use crate::search::results::{ESet, ESetItem};
use crate::search::rset::RSet;

/// Suggests terms from the relevant documents
pub struct Expand<'a> {
    backend: &'a dyn Backend,
}

impl<'a> Expand<'a> {
    pub fn new(backend: &'a dyn Backend) -> Self {
        Expand { backend }
    }

    pub fn expand(&self, maxitems: TermCount, rset: &RSet, decider: &dyn ExpandDecider) -> Result<ESet> {
        let collection_size = self.backend.doc_count();
        let mut candidates = Vec::new();
        let mut ebound: TermCount = 0;

        for (tname, rel_term_freq) in rset.terms() {
            if !decider.accept(tname) {
                continue;
            }
            ebound += 1;

            let weight = expand_weight(
                collection_size,
                self.backend.term_freq(tname),
                rset.rset_size(),
                rel_term_freq,
            );
            if weight > 0.0 {
                candidates.push(ESetItem { tname: tname.to_string(), weight });
            }
        }

        candidates.sort_by(|a, b| {
            b.weight
                .partial_cmp(&a.weight)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.tname.cmp(&b.tname))
        });
        candidates.truncate(maxitems as usize);

        debug!(ebound, returned = candidates.len(), "Expand");
        Ok(ESet { items: candidates, ebound })
    }
}

/// Relevance-feedback weight of a term occurring in `r` of `big_r`
/// relevant documents and `n` of `n_docs` documents overall
fn expand_weight(n_docs: DocCount, n: DocCount, big_r: DocCount, r: DocCount) -> Weight {
    let n_docs = n_docs as f64;
    let n = n as f64;
    let big_r = big_r as f64;
    let r = r as f64;

    let numerator = (r + 0.5) * (n_docs - n - big_r + r + 0.5);
    let denominator = (big_r - r + 0.5) * (n - r + 0.5);
    if numerator <= 0.0 || denominator <= 0.0 {
        return 0.0;
    }
    r * (numerator / denominator).ln()
}

use std::collections::{BTreeMap, BTreeSet};
use serde::{Serialize, Deserialize};
use crate::core::error::Result;
use crate::core::types::{DocCount, DocId};
use crate::index::backend::Backend;

/// Documents the caller has marked relevant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelevanceSet {
    items: BTreeSet<DocId>,
}

impl RelevanceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_document(&mut self, did: DocId) {
        self.items.insert(did);
    }

    pub fn remove_document(&mut self, did: DocId) {
        self.items.remove(&did);
    }

    pub fn contains(&self, did: DocId) -> bool {
        self.items.contains(&did)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = DocId> + '_ {
        self.items.iter().copied()
    }
}

impl FromIterator<DocId> for RelevanceSet {
    fn from_iter<I: IntoIterator<Item = DocId>>(iter: I) -> Self {
        RelevanceSet {
            items: iter.into_iter().collect(),
        }
    }
}

/// Relevance set resolved against a backend: how many relevant
/// documents each term occurs in.
#[derive(Debug, Clone, Default)]
pub struct RSet {
    rset_size: DocCount,
    rel_term_freqs: BTreeMap<String, DocCount>,
}

impl RSet {
    pub fn new(backend: &dyn Backend, relevance: &RelevanceSet) -> Result<Self> {
        let mut rel_term_freqs: BTreeMap<String, DocCount> = BTreeMap::new();

        for did in relevance.iter() {
            let mut terms = backend.open_term_list(did)?;
            terms.next()?;
            while !terms.at_end() {
                *rel_term_freqs.entry(terms.term_name().to_string()).or_insert(0) += 1;
                terms.next()?;
            }
        }

        Ok(RSet {
            rset_size: relevance.len() as DocCount,
            rel_term_freqs,
        })
    }

    pub fn rset_size(&self) -> DocCount {
        self.rset_size
    }

    pub fn rel_term_freq(&self, tname: &str) -> DocCount {
        self.rel_term_freqs.get(tname).copied().unwrap_or(0)
    }

    /// Every term of the relevant documents, with its relevant frequency
    pub fn terms(&self) -> impl Iterator<Item = (&str, DocCount)> + '_ {
        self.rel_term_freqs.iter().map(|(tname, &freq)| (tname.as_str(), freq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::index::inverted::{InMemoryBackend, SourceDocument};

    fn backend() -> InMemoryBackend {
        InMemoryBackend::from_documents(vec![
            SourceDocument::new(["a", "b", "b"]),
            SourceDocument::new(["b", "c"]),
            SourceDocument::new(["d"]),
        ])
    }

    #[test]
    fn test_relevance_set_ops() {
        let mut rset: RelevanceSet = [DocId(3), DocId(1)].into_iter().collect();
        rset.add_document(DocId(1));
        assert_eq!(rset.len(), 2);
        assert_eq!(rset.iter().collect::<Vec<_>>(), vec![DocId(1), DocId(3)]);

        rset.remove_document(DocId(3));
        assert!(!rset.contains(DocId(3)));
        assert!(rset.contains(DocId(1)));
    }

    #[test]
    fn test_rset_counts_relevant_documents() {
        let relevance: RelevanceSet = [DocId(1), DocId(2)].into_iter().collect();
        let rset = RSet::new(&backend(), &relevance).unwrap();

        assert_eq!(rset.rset_size(), 2);
        assert_eq!(rset.rel_term_freq("b"), 2);
        assert_eq!(rset.rel_term_freq("a"), 1);
        assert_eq!(rset.rel_term_freq("d"), 0);
        assert_eq!(rset.terms().count(), 3);
    }

    #[test]
    fn test_rset_unknown_document() {
        let relevance: RelevanceSet = [DocId(9)].into_iter().collect();
        let err = RSet::new(&backend(), &relevance).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}

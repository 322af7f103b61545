use crate::core::types::{DocCount, DocId, TermCount};

#[derive(Debug, Clone, PartialEq)]
pub struct Posting {
    pub doc_id: DocId,
    pub wdf: TermCount,  // Within-document frequency
}

/// Posting list for a term
/// Note: Sorted by doc_id for efficient merging
#[derive(Debug, Clone, Default)]
pub struct PostingList {
    pub postings: Vec<Posting>,
}

impl PostingList {
    pub fn new() -> Self {
        PostingList {
            postings: Vec::new(),
        }
    }

    pub fn add_posting(&mut self, posting: Posting) {
        match self.postings.binary_search_by_key(&posting.doc_id, |p| p.doc_id) {
            Ok(pos) => {
                // Update existing posting
                self.postings[pos] = posting;
            }
            Err(pos) => {
                self.postings.insert(pos, posting);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    pub fn doc_freq(&self) -> DocCount {
        self.postings.len() as DocCount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(id: u32, wdf: TermCount) -> Posting {
        Posting { doc_id: DocId(id), wdf }
    }

    #[test]
    fn test_postings_stay_sorted() {
        let mut list = PostingList::new();
        list.add_posting(posting(5, 1));
        list.add_posting(posting(2, 1));
        list.add_posting(posting(9, 1));

        let ids: Vec<u32> = list.postings.iter().map(|p| p.doc_id.0).collect();
        assert_eq!(ids, vec![2, 5, 9]);
        assert_eq!(list.doc_freq(), 3);
    }

    #[test]
    fn test_add_replaces_existing() {
        let mut list = PostingList::new();
        list.add_posting(posting(3, 1));
        list.add_posting(posting(3, 4));
        assert_eq!(list.len(), 1);
        assert_eq!(list.postings[0].wdf, 4);
    }
}

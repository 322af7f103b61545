use crate::core::error::Result;
use crate::core::types::{DocCount, DocId, Document, TermCount};
use crate::index::posting::Posting;

/// Read access to an opened database
pub trait Backend: Send + Sync {
    fn doc_count(&self) -> DocCount;

    /// Average document length in terms
    fn avg_length(&self) -> f64;

    fn doc_length(&self, did: DocId) -> Result<TermCount>;

    /// Number of documents indexed by `tname`
    fn term_freq(&self, tname: &str) -> DocCount;

    /// Postings for `tname`, sorted by document id
    fn postings(&self, tname: &str) -> Result<Vec<Posting>>;

    fn open_document(&self, did: DocId) -> Result<Document>;

    /// Terms indexing `did`, in ascending term order
    fn open_term_list(&self, did: DocId) -> Result<Box<dyn TermList>>;
}

/// Cursor over the terms of one document.
///
/// `next()` must be called once before the first read.
pub trait TermList: Send {
    fn next(&mut self) -> Result<()>;

    fn at_end(&self) -> bool;

    fn term_name(&self) -> &str;

    /// Within-document frequency of the current term
    fn wdf(&self) -> TermCount;

    /// Collection frequency of the current term
    fn term_freq(&self) -> DocCount;
}

#[derive(Debug, Clone, PartialEq)]
pub struct TermListEntry {
    pub tname: String,
    pub wdf: TermCount,
    pub term_freq: DocCount,
}

/// Term list over a materialised entry vector
#[derive(Debug)]
pub struct VecTermList {
    entries: Vec<TermListEntry>,
    cursor: usize,
    started: bool,
}

impl VecTermList {
    pub fn new(entries: Vec<TermListEntry>) -> Self {
        VecTermList {
            entries,
            cursor: 0,
            started: false,
        }
    }

    fn current(&self) -> Option<&TermListEntry> {
        debug_assert!(self.started, "TermList read before next()");
        self.entries.get(self.cursor)
    }
}

impl TermList for VecTermList {
    fn next(&mut self) -> Result<()> {
        if self.started {
            self.cursor += 1;
        } else {
            self.started = true;
        }
        Ok(())
    }

    fn at_end(&self) -> bool {
        self.started && self.cursor >= self.entries.len()
    }

    fn term_name(&self) -> &str {
        self.current().map(|e| e.tname.as_str()).unwrap_or("")
    }

    fn wdf(&self) -> TermCount {
        self.current().map(|e| e.wdf).unwrap_or(0)
    }

    fn term_freq(&self) -> DocCount {
        self.current().map(|e| e.term_freq).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(tname: &str) -> TermListEntry {
        TermListEntry { tname: tname.to_string(), wdf: 1, term_freq: 1 }
    }

    #[test]
    fn test_term_list_walk() {
        let mut list = VecTermList::new(vec![entry("a"), entry("b")]);
        assert!(!list.at_end());

        let mut seen = Vec::new();
        list.next().unwrap();
        while !list.at_end() {
            seen.push(list.term_name().to_string());
            list.next().unwrap();
        }
        assert_eq!(seen, vec!["a", "b"]);
    }

    #[test]
    fn test_empty_term_list() {
        let mut list = VecTermList::new(Vec::new());
        list.next().unwrap();
        assert!(list.at_end());
    }
}

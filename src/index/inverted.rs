use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use serde::{Serialize, Deserialize};
use tracing::debug;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{DocCount, DocId, Document, KeyNo, TermCount};
use crate::index::backend::{Backend, TermList, TermListEntry, VecTermList};
use crate::index::posting::{Posting, PostingList};

/// Document as supplied for indexing. `terms` lists every occurrence;
/// repeats raise the term's wdf.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub keys: BTreeMap<KeyNo, String>,
    pub terms: Vec<String>,
}

impl SourceDocument {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SourceDocument {
            data: String::new(),
            keys: BTreeMap::new(),
            terms: terms.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = data.into();
        self
    }

    pub fn with_key(mut self, keyno: KeyNo, value: impl Into<String>) -> Self {
        self.keys.insert(keyno, value.into());
        self
    }
}

struct StoredDocument {
    data: String,
    keys: BTreeMap<KeyNo, String>,
    length: TermCount,
    terms: BTreeMap<String, TermCount>,  // Term -> wdf, in term order
}

/// Inverted index held entirely in memory
pub struct InMemoryBackend {
    postings: HashMap<String, PostingList>,
    documents: Vec<StoredDocument>,
    total_length: u64,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        InMemoryBackend {
            postings: HashMap::new(),
            documents: Vec::new(),
            total_length: 0,
        }
    }

    pub fn from_documents<I>(documents: I) -> Self
    where
        I: IntoIterator<Item = SourceDocument>,
    {
        let mut backend = InMemoryBackend::new();
        for doc in documents {
            backend.add_document(doc);
        }
        backend
    }

    /// Load every file in `paths`; each holds a JSON array of source documents
    pub fn from_json_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut backend = InMemoryBackend::new();
        for path in paths {
            let path = path.as_ref();
            let bytes = fs::read(path)?;
            let documents: Vec<SourceDocument> = serde_json::from_slice(&bytes)?;
            debug!(path = %path.display(), count = documents.len(), "Loading in-memory documents");
            for doc in documents {
                backend.add_document(doc);
            }
        }
        Ok(backend)
    }

    pub fn add_document(&mut self, doc: SourceDocument) -> DocId {
        let doc_id = DocId(self.documents.len() as u32 + 1);

        // Count occurrences per term
        let mut terms: BTreeMap<String, TermCount> = BTreeMap::new();
        for term in &doc.terms {
            *terms.entry(term.clone()).or_insert(0) += 1;
        }

        for (term, &wdf) in &terms {
            self.postings.entry(term.clone())
                .or_default()
                .add_posting(Posting { doc_id, wdf });
        }

        let length = doc.terms.len() as TermCount;
        self.total_length += length as u64;
        self.documents.push(StoredDocument {
            data: doc.data,
            keys: doc.keys,
            length,
            terms,
        });

        doc_id
    }

    fn stored(&self, did: DocId) -> Result<&StoredDocument> {
        (did.0 as usize)
            .checked_sub(1)
            .and_then(|idx| self.documents.get(idx))
            .ok_or_else(|| Error::new(ErrorKind::NotFound, format!("Document {} not found", did)))
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for InMemoryBackend {
    fn doc_count(&self) -> DocCount {
        self.documents.len() as DocCount
    }

    fn avg_length(&self) -> f64 {
        if self.documents.is_empty() {
            0.0
        } else {
            self.total_length as f64 / self.documents.len() as f64
        }
    }

    fn doc_length(&self, did: DocId) -> Result<TermCount> {
        Ok(self.stored(did)?.length)
    }

    fn term_freq(&self, tname: &str) -> DocCount {
        self.postings.get(tname).map(PostingList::doc_freq).unwrap_or(0)
    }

    fn postings(&self, tname: &str) -> Result<Vec<Posting>> {
        Ok(self.postings
            .get(tname)
            .map(|list| list.postings.clone())
            .unwrap_or_default())
    }

    fn open_document(&self, did: DocId) -> Result<Document> {
        let stored = self.stored(did)?;
        Ok(Document {
            id: did,
            data: stored.data.clone(),
            keys: stored.keys.clone(),
        })
    }

    fn open_term_list(&self, did: DocId) -> Result<Box<dyn TermList>> {
        let stored = self.stored(did)?;
        let entries = stored.terms
            .iter()
            .map(|(tname, &wdf)| TermListEntry {
                tname: tname.clone(),
                wdf,
                term_freq: self.term_freq(tname),
            })
            .collect();
        Ok(Box::new(VecTermList::new(entries)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample() -> InMemoryBackend {
        InMemoryBackend::from_documents(vec![
            SourceDocument::new(["rust", "search", "rust"]).with_data("first"),
            SourceDocument::new(["search", "engine"]).with_key(0, "group-a"),
        ])
    }

    #[test]
    fn test_statistics() {
        let backend = sample();
        assert_eq!(backend.doc_count(), 2);
        assert_eq!(backend.avg_length(), 2.5);
        assert_eq!(backend.term_freq("search"), 2);
        assert_eq!(backend.term_freq("missing"), 0);
        assert_eq!(backend.doc_length(DocId(1)).unwrap(), 3);
    }

    #[test]
    fn test_postings_carry_wdf() {
        let backend = sample();
        let postings = backend.postings("rust").unwrap();
        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].doc_id, DocId(1));
        assert_eq!(postings[0].wdf, 2);
    }

    #[test]
    fn test_open_document() {
        let backend = sample();
        let doc = backend.open_document(DocId(2)).unwrap();
        assert_eq!(doc.get_key(0), Some("group-a"));
        assert_eq!(backend.open_document(DocId(1)).unwrap().data, "first");

        for missing in [DocId(0), DocId(3)] {
            let err = backend.open_document(missing).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotFound);
        }
    }

    #[test]
    fn test_term_list_sorted() {
        let backend = sample();
        let mut list = backend.open_term_list(DocId(1)).unwrap();
        list.next().unwrap();
        let mut terms = Vec::new();
        while !list.at_end() {
            terms.push((list.term_name().to_string(), list.wdf(), list.term_freq()));
            list.next().unwrap();
        }
        assert_eq!(terms, vec![
            ("rust".to_string(), 2, 1),
            ("search".to_string(), 1, 2),
        ]);
    }

    #[test]
    fn test_load_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"data": "doc", "keys": {{"1": "k"}}, "terms": ["a", "b"]}}, {{"terms": ["b"]}}]"#).unwrap();

        let backend = InMemoryBackend::from_json_files(&[file.path()]).unwrap();
        assert_eq!(backend.doc_count(), 2);
        assert_eq!(backend.term_freq("b"), 2);
        assert_eq!(backend.open_document(DocId(1)).unwrap().get_key(1), Some("k"));
    }

    #[test]
    fn test_load_rejects_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = InMemoryBackend::from_json_files(&[file.path()]).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }
}

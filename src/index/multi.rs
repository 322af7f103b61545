use std::sync::Arc;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{DocCount, DocId, Document, TermCount};
use crate::index::backend::{Backend, TermList, TermListEntry, VecTermList};
use crate::index::posting::Posting;

/// Fan-out view over several backends.
///
/// Document ids are interleaved: local id `l` of sub-database `i` (of `n`)
/// becomes global id `(l - 1) * n + i + 1`.
pub struct MultiBackend {
    databases: Vec<Arc<dyn Backend>>,
}

impl MultiBackend {
    pub fn new(databases: Vec<Arc<dyn Backend>>) -> Result<Self> {
        if databases.is_empty() {
            return Err(Error::invalid_argument("Multi database needs at least one sub-database"));
        }
        Ok(MultiBackend { databases })
    }

    pub fn database_count(&self) -> usize {
        self.databases.len()
    }

    fn to_local(&self, did: DocId) -> Result<(&dyn Backend, DocId)> {
        let n = self.databases.len() as u32;
        let zero_based = did.0.checked_sub(1)
            .ok_or_else(|| Error::new(ErrorKind::NotFound, format!("Document {} not found", did)))?;
        let db = &self.databases[(zero_based % n) as usize];
        Ok((db.as_ref(), DocId(zero_based / n + 1)))
    }

    fn to_global(&self, index: usize, local: DocId) -> DocId {
        let n = self.databases.len() as u32;
        DocId((local.0 - 1) * n + index as u32 + 1)
    }
}

impl Backend for MultiBackend {
    fn doc_count(&self) -> DocCount {
        self.databases.iter().map(|db| db.doc_count()).sum()
    }

    fn avg_length(&self) -> f64 {
        let total_docs = self.doc_count();
        if total_docs == 0 {
            return 0.0;
        }
        let total_length: f64 = self.databases
            .iter()
            .map(|db| db.avg_length() * db.doc_count() as f64)
            .sum();
        total_length / total_docs as f64
    }

    fn doc_length(&self, did: DocId) -> Result<TermCount> {
        let (db, local) = self.to_local(did)?;
        db.doc_length(local)
    }

    fn term_freq(&self, tname: &str) -> DocCount {
        self.databases.iter().map(|db| db.term_freq(tname)).sum()
    }

    fn postings(&self, tname: &str) -> Result<Vec<Posting>> {
        let mut merged = Vec::new();
        for (index, db) in self.databases.iter().enumerate() {
            for mut posting in db.postings(tname)? {
                posting.doc_id = self.to_global(index, posting.doc_id);
                merged.push(posting);
            }
        }
        merged.sort_by_key(|p| p.doc_id);
        Ok(merged)
    }

    fn open_document(&self, did: DocId) -> Result<Document> {
        let (db, local) = self.to_local(did)?;
        let mut doc = db.open_document(local)?;
        doc.id = did;
        Ok(doc)
    }

    fn open_term_list(&self, did: DocId) -> Result<Box<dyn TermList>> {
        let (db, local) = self.to_local(did)?;
        let mut sub = db.open_term_list(local)?;

        // Re-read through the sub list so term frequencies cover every database
        let mut entries = Vec::new();
        sub.next()?;
        while !sub.at_end() {
            let tname = sub.term_name().to_string();
            let term_freq = self.term_freq(&tname);
            entries.push(TermListEntry { tname, wdf: sub.wdf(), term_freq });
            sub.next()?;
        }
        Ok(Box::new(VecTermList::new(entries)))
    }
}

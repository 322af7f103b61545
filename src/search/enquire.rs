use std::collections::HashMap;
use std::sync::Arc;
use parking_lot::Mutex;
use tracing::{debug, info};
use crate::core::config::Config;
use crate::core::database::{Database, DatabaseParams};
use crate::core::error::{Error, Result};
use crate::core::types::{DocCount, DocId, Document, TermCount};
use crate::index::backend::Backend;
use crate::index::builder::{BackendOpener, DatabaseBuilder};
use crate::query::ast::QueryTree;
use crate::query::handle::Query;
use crate::scoring::scorer::BM25Scorer;
use crate::search::decider::{
    ExpandDecider, ExpandDeciderAlways, ExpandDeciderAnd, ExpandDeciderFilterTerms, MatchDecider,
};
use crate::search::expand::Expand;
use crate::search::matcher::LeafMatch;
use crate::search::options::{ExpandOptions, MatchOptions};
use crate::search::results::{ESet, MSet, MSetItem};
use crate::search::rset::{RSet, RelevanceSet};

struct EnquireState {
    database: Option<Arc<dyn Backend>>,  // Opened on first use
    dbdesc: Database,
    query: Option<QueryTree>,
}

/// Runs queries against a set of databases.
///
/// The backend is opened lazily by the first operation that needs it and
/// kept for the lifetime of the `Enquire`. Every public method holds the
/// internal lock for its full duration.
pub struct Enquire {
    inner: Mutex<EnquireState>,
    opener: Arc<dyn BackendOpener>,
    config: Config,
}

impl Enquire {
    pub fn new(database: &Database) -> Self {
        Self::with_config(database, Config::default())
    }

    pub fn with_config(database: &Database, config: Config) -> Self {
        let opener = Arc::new(DatabaseBuilder::new(config.parallel_open));
        Self::with_config_and_opener(database, config, opener)
    }

    /// Use `opener` instead of the built-in backends
    pub fn with_opener(database: &Database, opener: Arc<dyn BackendOpener>) -> Self {
        Self::with_config_and_opener(database, Config::default(), opener)
    }

    /// `parallel_open` is left to `opener`; the weighting parameters apply
    pub fn with_config_and_opener(database: &Database, config: Config, opener: Arc<dyn BackendOpener>) -> Self {
        Enquire {
            inner: Mutex::new(EnquireState {
                database: None,
                dbdesc: database.clone(),
                query: None,
            }),
            opener,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Bind `query`, replacing any previous one. The previous binding is
    /// kept if `query` is undefined.
    pub fn set_query(&self, query: &Query) -> Result<()> {
        let tree = query.snapshot();
        if !tree.is_defined() {
            return Err(Error::invalid_argument("Can't set an undefined query"));
        }

        debug!(query = %tree, "Query bound");
        self.inner.lock().query = Some(tree);
        Ok(())
    }

    /// Copy of the bound query, if any
    pub fn query(&self) -> Option<Query> {
        self.inner.lock().query.clone().map(Query::from_tree)
    }

    /// Items `first..first + maxitems` of the ranking for the bound query
    pub fn mset(
        &self,
        first: DocCount,
        maxitems: DocCount,
        relevance: Option<&RelevanceSet>,
        options: Option<&MatchOptions>,
        decider: Option<&dyn MatchDecider>,
    ) -> Result<MSet> {
        let mut state = self.inner.lock();
        let query = state
            .query
            .clone()
            .ok_or_else(|| Error::invalid_argument("Can't get match set before setting query"))?;
        let database = self.open_database(&mut state)?;

        let rset = match relevance {
            Some(relevance) if !relevance.is_empty() => {
                debug!(documents = relevance.len(), "Building relevance set");
                Some(RSet::new(database.as_ref(), relevance)?)
            }
            _ => None,
        };

        let default_options = MatchOptions::default();
        let options = options.unwrap_or(&default_options);

        let mut matcher = LeafMatch::new(database.as_ref());
        matcher.set_scorer(Box::new(BM25Scorer::new(self.config.bm25_k1, self.config.bm25_b)));
        matcher.set_query(&query);
        if let Some(rset) = rset.as_ref() {
            matcher.set_rset(rset);
        }
        if let Some(percent) = options.percent_cutoff().filter(|&percent| percent > 0) {
            matcher.set_min_weight_percent(percent);
        }
        if let Some(keyno) = options.collapse_key() {
            matcher.set_collapse_key(keyno);
        }

        let mset = if query.is_bool() {
            let items = matcher.boolmatch(first, maxitems)?;
            MSet {
                matches_lower_bound: items.len() as DocCount,
                max_possible: 1.0,
                max_attained: if items.is_empty() { 0.0 } else { 1.0 },
                first_item: first,
                items,
            }
        } else {
            let result = matcher.run(first, maxitems, options.sort_forward(), decider)?;
            MSet {
                items: result.items,
                first_item: first,
                matches_lower_bound: result.matches_lower_bound,
                max_possible: matcher.get_max_weight(),
                max_attained: result.max_attained,
            }
        };

        debug!(first, returned = mset.len(), matches = mset.matches_lower_bound, "Match complete");
        Ok(mset)
    }

    /// Terms worth adding to the query, drawn from the relevant documents
    pub fn eset(
        &self,
        maxitems: TermCount,
        relevance: &RelevanceSet,
        options: Option<&ExpandOptions>,
        decider: Option<&dyn ExpandDecider>,
    ) -> Result<ESet> {
        let mut state = self.inner.lock();
        let database = self.open_database(&mut state)?;
        let rset = RSet::new(database.as_ref(), relevance)?;

        let allow_query_terms = options.is_some_and(ExpandOptions::allow_query_terms);
        let user_decider: &dyn ExpandDecider = decider.unwrap_or(&ExpandDeciderAlways);

        let expand = Expand::new(database.as_ref());
        match state.query.as_ref() {
            Some(query) if !allow_query_terms => {
                let query_terms = ExpandDeciderFilterTerms::new(query.terms());
                let combined = ExpandDeciderAnd::new(&query_terms, user_decider);
                expand.expand(maxitems, &rset, &combined)
            }
            _ => expand.expand(maxitems, &rset, user_decider),
        }
    }

    pub fn document(&self, did: DocId) -> Result<Document> {
        let mut state = self.inner.lock();
        let database = self.open_database(&mut state)?;
        database.open_document(did)
    }

    pub fn document_for(&self, item: &MSetItem) -> Result<Document> {
        self.document(item.did)
    }

    /// Terms of the bound query that index `did`, in query order
    pub fn matching_terms(&self, did: DocId) -> Result<Vec<String>> {
        let mut state = self.inner.lock();
        let query_terms = state
            .query
            .as_ref()
            .map(QueryTree::terms)
            .ok_or_else(|| Error::invalid_argument("Can't get matching terms before setting query"))?;
        let database = self.open_database(&mut state)?;

        let rank: HashMap<&str, usize> = query_terms
            .iter()
            .enumerate()
            .map(|(i, tname)| (tname.as_str(), i))
            .collect();

        let mut matches = Vec::new();
        let mut terms = database.open_term_list(did)?;
        terms.next()?;
        while !terms.at_end() {
            if let Some(&position) = rank.get(terms.term_name()) {
                matches.push(position);
            }
            terms.next()?;
        }

        matches.sort_unstable();
        Ok(matches.into_iter().map(|i| query_terms[i].clone()).collect())
    }

    pub fn matching_terms_for(&self, item: &MSetItem) -> Result<Vec<String>> {
        self.matching_terms(item.did)
    }

    fn open_database(&self, state: &mut EnquireState) -> Result<Arc<dyn Backend>> {
        if let Some(database) = state.database.as_ref() {
            return Ok(Arc::clone(database));
        }

        let database = match state.dbdesc.params() {
            [] => return Err(Error::invalid_argument("Must have at least one database to open")),
            [single] => self.opener.open(single)?,
            many => self.opener.open(&DatabaseParams::multi(many.to_vec()))?,
        };
        info!(databases = state.dbdesc.len(), docs = database.doc_count(), "Enquire opened database");

        state.database = Some(Arc::clone(&database));
        Ok(database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::index::inverted::{InMemoryBackend, SourceDocument};

    struct Fixed(Arc<dyn Backend>);

    impl BackendOpener for Fixed {
        fn open(&self, _params: &DatabaseParams) -> Result<Arc<dyn Backend>> {
            Ok(Arc::clone(&self.0))
        }
    }

    fn fixed_opener() -> Arc<Fixed> {
        let backend = InMemoryBackend::from_documents(vec![
            SourceDocument::new(["x", "apple"]).with_data("first"),
            SourceDocument::new(["z", "x", "pear"]).with_data("second"),
            SourceDocument::new(["y"]).with_data("third"),
        ]);
        Arc::new(Fixed(Arc::new(backend)))
    }

    fn registered() -> Database {
        let mut db = Database::new();
        db.add_database("inmemory", ["unused.json"]);
        db
    }

    fn enquire() -> Enquire {
        Enquire::with_opener(&registered(), fixed_opener())
    }

    #[test]
    fn test_set_query_rejects_undefined() {
        let enquire = enquire();
        enquire.set_query(&Query::term("x", 1, 1)).unwrap();

        let err = enquire.set_query(&Query::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        // Previous binding survives
        assert_eq!(enquire.query().unwrap().description(), "x");
    }

    #[test]
    fn test_mset_requires_query() {
        let err = enquire().mset(0, 10, None, None, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_mset_records_offset() {
        let enquire = enquire();
        enquire.set_query(&Query::term("x", 1, 1)).unwrap();
        let mset = enquire.mset(1, 10, None, None, None).unwrap();
        assert_eq!(mset.first_item, 1);
        assert_eq!(mset.len(), 1);
        assert_eq!(mset.matches_lower_bound, 2);
        assert!(mset.max_attained <= mset.max_possible);
    }

    #[test]
    fn test_boolean_query_mset() {
        let enquire = enquire();
        let query = Query::term("x", 1, 1);
        query.set_bool(true);
        enquire.set_query(&query).unwrap();

        let mset = enquire.mset(0, 10, None, None, None).unwrap();
        assert_eq!(mset.max_possible, 1.0);
        assert_eq!(mset.max_attained, 1.0);
        assert_eq!(mset.matches_lower_bound, 2);
        assert_eq!(mset.percent(&mset.items[0]), 100);

        let empty = enquire.mset(5, 10, None, None, None).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.max_attained, 0.0);
    }

    #[test]
    fn test_matching_terms_in_query_order() {
        let enquire = enquire();
        let query = Query::from_terms(crate::query::ast::QueryOp::Or, ["x", "y", "z"]).unwrap();
        enquire.set_query(&query).unwrap();

        assert_eq!(enquire.matching_terms(DocId(2)).unwrap(), vec!["x", "z"]);
        let item = MSetItem { did: DocId(3), weight: 1.0, collapse_key: None };
        assert_eq!(enquire.matching_terms_for(&item).unwrap(), vec!["y"]);
    }

    #[test]
    fn test_document_lookup() {
        let enquire = enquire();
        assert_eq!(enquire.document(DocId(2)).unwrap().data, "second");
        let err = enquire.document(DocId(42)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_no_databases() {
        let enquire = Enquire::new(&Database::new());
        let err = enquire.document(DocId(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_eset_without_query() {
        let enquire = enquire();
        let relevance: RelevanceSet = [DocId(2)].into_iter().collect();
        let eset = enquire.eset(10, &relevance, None, None).unwrap();
        assert_eq!(eset.ebound, 3);
    }

    #[test]
    fn test_custom_opener_keeps_config() {
        let config = Config { bm25_k1: 2.0, ..Config::default() };
        let tuned = Enquire::with_config_and_opener(&registered(), config.clone(), fixed_opener());
        assert_eq!(tuned.config(), &config);

        let query = Query::term("x", 1, 1);
        tuned.set_query(&query).unwrap();
        let plain = enquire();
        plain.set_query(&query).unwrap();

        let tuned_max = tuned.mset(0, 10, None, None, None).unwrap().max_possible;
        let plain_max = plain.mset(0, 10, None, None, None).unwrap().max_possible;
        // The per-term bound scales with k1 + 1
        assert!((tuned_max / plain_max - 3.0 / 2.2).abs() < 1e-9);
    }
}

use std::fmt;
use parking_lot::Mutex;
use crate::core::error::Result;
use crate::core::types::{TermCount, TermPos};
use crate::query::ast::{QueryOp, QueryTree};

/// Thread-safe, value-semantics handle on a query tree.
///
/// Every accessor takes the handle's own lock for its whole duration.
/// Cloning deep-copies the tree, so two handles never share state.
pub struct Query {
    internal: Mutex<QueryTree>,
}

impl Query {
    /// The undefined query
    pub fn new() -> Self {
        Query::from_tree(QueryTree::undefined())
    }

    pub fn term(tname: impl Into<String>, wqf: TermCount, term_pos: TermPos) -> Self {
        Query::from_tree(QueryTree::term(tname, wqf, term_pos))
    }

    pub fn combine(op: QueryOp, left: &Query, right: &Query) -> Result<Self> {
        // Snapshot each side separately; left and right may be the same handle
        let left = left.snapshot();
        let right = right.snapshot();
        QueryTree::combine(op, &left, &right).map(Query::from_tree)
    }

    pub fn from_queries<'a, I>(op: QueryOp, queries: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Query>,
    {
        let trees: Vec<QueryTree> = queries.into_iter().map(Query::snapshot).collect();
        QueryTree::from_subqueries(op, &trees).map(Query::from_tree)
    }

    pub fn from_terms<I, S>(op: QueryOp, tnames: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        QueryTree::from_terms(op, tnames).map(Query::from_tree)
    }

    pub fn from_tree(tree: QueryTree) -> Self {
        Query {
            internal: Mutex::new(tree),
        }
    }

    /// Deep copy of the current tree
    pub fn snapshot(&self) -> QueryTree {
        self.internal.lock().clone()
    }

    pub fn description(&self) -> String {
        self.internal.lock().description()
    }

    pub fn is_defined(&self) -> bool {
        self.internal.lock().is_defined()
    }

    pub fn is_bool(&self) -> bool {
        self.internal.lock().is_bool()
    }

    pub fn set_bool(&self, is_bool: bool) -> bool {
        self.internal.lock().set_bool(is_bool)
    }

    pub fn length(&self) -> TermCount {
        self.internal.lock().length()
    }

    pub fn set_length(&self, qlen: TermCount) -> TermCount {
        self.internal.lock().set_length(qlen)
    }

    pub fn terms(&self) -> Vec<String> {
        self.internal.lock().terms()
    }
}

impl Default for Query {
    fn default() -> Self {
        Query::new()
    }
}

impl Clone for Query {
    fn clone(&self) -> Self {
        Query::from_tree(self.snapshot())
    }
}

impl PartialEq for Query {
    fn eq(&self, other: &Self) -> bool {
        self.snapshot() == other.snapshot()
    }
}

impl From<QueryTree> for Query {
    fn from(tree: QueryTree) -> Self {
        Query::from_tree(tree)
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Query").field(&*self.internal.lock()).finish()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Query({})", self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use crate::core::error::ErrorKind;

    #[test]
    fn test_clone_is_independent() {
        let original = Query::term("rust", 1, 1);
        let copy = original.clone();
        copy.set_bool(true);
        copy.set_length(42);

        assert!(!original.is_bool());
        assert_eq!(original.length(), 1);
        assert!(copy.is_bool());
    }

    #[test]
    fn test_combine_same_handle_twice() {
        let q = Query::term("a", 1, 1);
        let combined = Query::combine(QueryOp::Or, &q, &q).unwrap();
        assert_eq!(combined.description(), "a");
        assert_eq!(combined.length(), 2);
    }

    #[test]
    fn test_from_queries_and_terms() {
        let a = Query::term("a", 1, 1);
        let b = Query::term("b", 1, 2);
        let q = Query::from_queries(QueryOp::And, [&a, &b]).unwrap();
        assert_eq!(q.description(), "(a AND b)");
        assert_eq!(q.terms(), vec!["a", "b"]);

        let err = Query::from_terms(QueryOp::Filter, ["a"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_display() {
        let q = Query::from_terms(QueryOp::Or, ["x", "y"]).unwrap();
        assert_eq!(q.to_string(), "Query((x OR y))");
        assert_eq!(Query::new().to_string(), "Query(<NULL>)");
    }

    #[test]
    fn test_concurrent_readers() {
        let q = Arc::new(Query::from_terms(QueryOp::And, ["one", "two", "three"]).unwrap());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let q = Arc::clone(&q);
                thread::spawn(move || {
                    for _ in 0..100 {
                        assert_eq!(q.terms().len(), 3);
                        assert!(q.is_defined());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}

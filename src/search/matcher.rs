use std::collections::{BTreeMap, HashMap};
use roaring::RoaringBitmap;
use tracing::debug;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{DocCount, DocId, KeyNo, Weight};
use crate::index::backend::Backend;
use crate::query::ast::{QueryNode, QueryOp, QueryTree};
use crate::scoring::scorer::{BM25Scorer, Scorer, TermStats};
use crate::search::decider::MatchDecider;
use crate::search::results::{MSetCollector, MSetItem};
use crate::search::rset::RSet;

type Scored = BTreeMap<DocId, Weight>;

/// Outcome of a weighted match
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub items: Vec<MSetItem>,
    pub matches_lower_bound: DocCount,
    pub max_attained: Weight,
}

/// Runs a query tree against one backend
pub struct LeafMatch<'a> {
    backend: &'a dyn Backend,
    scorer: Box<dyn Scorer>,
    query: Option<QueryTree>,
    rset: Option<&'a RSet>,
    collapse_key: Option<KeyNo>,
    min_weight_percent: Option<u8>,
}

impl<'a> LeafMatch<'a> {
    pub fn new(backend: &'a dyn Backend) -> Self {
        LeafMatch {
            backend,
            scorer: Box::new(BM25Scorer::default()),
            query: None,
            rset: None,
            collapse_key: None,
            min_weight_percent: None,
        }
    }

    pub fn set_scorer(&mut self, scorer: Box<dyn Scorer>) {
        self.scorer = scorer;
    }

    pub fn set_query(&mut self, query: &QueryTree) {
        self.query = Some(query.clone());
    }

    pub fn set_rset(&mut self, rset: &'a RSet) {
        self.rset = Some(rset);
    }

    pub fn set_collapse_key(&mut self, keyno: KeyNo) {
        self.collapse_key = Some(keyno);
    }

    pub fn set_min_weight_percent(&mut self, percent: u8) {
        self.min_weight_percent = Some(percent);
    }

    fn query(&self) -> Result<&QueryTree> {
        self.query
            .as_ref()
            .ok_or_else(|| Error::invalid_argument("No query set on matcher"))
    }

    fn term_stats(&self, tname: &str) -> TermStats {
        TermStats {
            collection_size: self.backend.doc_count(),
            term_freq: self.backend.term_freq(tname),
            rset_size: self.rset.map(RSet::rset_size).unwrap_or(0),
            rel_term_freq: self.rset.map(|r| r.rel_term_freq(tname)).unwrap_or(0),
            avg_length: self.backend.avg_length(),
        }
    }

    /// Highest weight any document could reach
    pub fn get_max_weight(&self) -> Weight {
        self.query.as_ref().map(|q| self.max_weight(q)).unwrap_or(0.0)
    }

    fn max_weight(&self, tree: &QueryTree) -> Weight {
        match tree.node() {
            QueryNode::Undefined => 0.0,
            QueryNode::Leaf(term) => {
                term.wqf as Weight * self.scorer.max_score(&self.term_stats(&term.tname))
            }
            QueryNode::Composite { op, subqueries } => match op {
                QueryOp::AndNot | QueryOp::Filter => {
                    subqueries.first().map(|q| self.max_weight(q)).unwrap_or(0.0)
                }
                _ => subqueries.iter().map(|q| self.max_weight(q)).sum(),
            },
        }
    }

    /// Weighted match. Returns items `first..first + maxitems` of the full
    /// ranking plus bookkeeping over every match.
    pub fn run(
        &self,
        first: DocCount,
        maxitems: DocCount,
        sort_forward: bool,
        decider: Option<&dyn MatchDecider>,
    ) -> Result<MatchResult> {
        let query = self.query()?;
        let scored = self.weighted(query)?;

        let min_weight = match self.min_weight_percent {
            Some(percent) => self.get_max_weight() * percent as Weight / 100.0,
            None => 0.0,
        };
        debug!(candidates = scored.len(), min_weight, "Weighted match");

        let mut survivors = Vec::with_capacity(scored.len());
        for (did, weight) in scored {
            if weight < min_weight {
                continue;
            }
            let needs_document = decider.is_some() || self.collapse_key.is_some();
            let doc = if needs_document {
                Some(self.backend.open_document(did)?)
            } else {
                None
            };
            if let (Some(decider), Some(doc)) = (decider, doc.as_ref()) {
                if !decider.accept(doc) {
                    continue;
                }
            }
            let collapse_key = match (self.collapse_key, doc.as_ref()) {
                (Some(keyno), Some(doc)) => doc.get_key(keyno).map(str::to_string),
                _ => None,
            };
            survivors.push(MSetItem { did, weight, collapse_key });
        }

        if self.collapse_key.is_some() {
            survivors = collapse_by_key(survivors, sort_forward);
        }

        let wanted = first as usize + maxitems as usize;
        let mut collector = MSetCollector::new(wanted, sort_forward);
        for item in survivors {
            collector.collect(item);
        }

        let matches_lower_bound = collector.total_collected as DocCount;
        let max_attained = collector.max_attained;
        let items = collector
            .into_sorted_items()
            .into_iter()
            .skip(first as usize)
            .collect();

        Ok(MatchResult {
            items,
            matches_lower_bound,
            max_attained,
        })
    }

    /// Unweighted match: every matching document, in id order
    pub fn boolmatch(&self, first: DocCount, maxitems: DocCount) -> Result<Vec<MSetItem>> {
        let query = self.query()?;
        let matches = self.boolean(query)?;
        debug!(matches = matches.len(), "Boolean match");

        Ok(matches
            .iter()
            .skip(first as usize)
            .take(maxitems as usize)
            .map(|did| MSetItem {
                did: DocId(did),
                weight: 1.0,
                collapse_key: None,
            })
            .collect())
    }

    fn weighted(&self, tree: &QueryTree) -> Result<Scored> {
        match tree.node() {
            QueryNode::Undefined => Ok(Scored::new()),
            QueryNode::Leaf(term) => {
                let stats = self.term_stats(&term.tname);
                let mut scored = Scored::new();
                for posting in self.backend.postings(&term.tname)? {
                    let doc_length = self.backend.doc_length(posting.doc_id)?;
                    let weight = self.scorer.score(posting.wdf, doc_length, &stats) * term.wqf as Weight;
                    scored.insert(posting.doc_id, weight);
                }
                Ok(scored)
            }
            QueryNode::Composite { op, subqueries } => {
                let children = subqueries
                    .iter()
                    .map(|q| self.weighted(q))
                    .collect::<Result<Vec<_>>>()?;
                combine_weighted(*op, children)
            }
        }
    }

    fn boolean(&self, tree: &QueryTree) -> Result<RoaringBitmap> {
        match tree.node() {
            QueryNode::Undefined => Ok(RoaringBitmap::new()),
            QueryNode::Leaf(term) => Ok(self.backend
                .postings(&term.tname)?
                .iter()
                .map(|p| p.doc_id.0)
                .collect()),
            QueryNode::Composite { op, subqueries } => {
                let mut children = subqueries
                    .iter()
                    .map(|q| self.boolean(q))
                    .collect::<Result<Vec<_>>>()?
                    .into_iter();
                let Some(mut acc) = children.next() else {
                    return Ok(RoaringBitmap::new());
                };
                for child in children {
                    match op {
                        QueryOp::And | QueryOp::Filter => acc &= child,
                        QueryOp::Or => acc |= child,
                        QueryOp::AndNot => acc -= child,
                        QueryOp::Xor => acc ^= child,
                        QueryOp::AndMaybe => {}
                        QueryOp::Leaf => return Err(leaf_composite()),
                    }
                }
                Ok(acc)
            }
        }
    }
}

fn leaf_composite() -> Error {
    Error::new(ErrorKind::Internal, "Composite query node with leaf operator".to_string())
}

fn combine_weighted(op: QueryOp, children: Vec<Scored>) -> Result<Scored> {
    let mut children = children.into_iter();
    let Some(first) = children.next() else {
        return Ok(Scored::new());
    };
    let rest: Vec<Scored> = children.collect();

    let combined = match op {
        QueryOp::And => first
            .into_iter()
            .filter_map(|(did, weight)| {
                let mut total = weight;
                for child in &rest {
                    total += child.get(&did)?;
                }
                Some((did, total))
            })
            .collect(),
        QueryOp::Or => {
            let mut acc = first;
            for child in rest {
                for (did, weight) in child {
                    *acc.entry(did).or_insert(0.0) += weight;
                }
            }
            acc
        }
        QueryOp::AndNot => first
            .into_iter()
            .filter(|(did, _)| !rest.iter().any(|child| child.contains_key(did)))
            .collect(),
        QueryOp::AndMaybe => first
            .into_iter()
            .map(|(did, weight)| {
                let extra: Weight = rest.iter().filter_map(|child| child.get(&did)).sum();
                (did, weight + extra)
            })
            .collect(),
        QueryOp::Filter => first
            .into_iter()
            .filter(|(did, _)| rest.iter().all(|child| child.contains_key(did)))
            .collect(),
        QueryOp::Xor => {
            let mut counts: HashMap<DocId, usize> = HashMap::new();
            let mut acc = Scored::new();
            for child in std::iter::once(first).chain(rest) {
                for (did, weight) in child {
                    *counts.entry(did).or_insert(0) += 1;
                    *acc.entry(did).or_insert(0.0) += weight;
                }
            }
            acc.retain(|did, _| counts.get(did).is_some_and(|count| count % 2 == 1));
            acc
        }
        QueryOp::Leaf => return Err(leaf_composite()),
    };
    Ok(combined)
}

/// Keep the best item per collapse key value; items without a value are kept
fn collapse_by_key(items: Vec<MSetItem>, sort_forward: bool) -> Vec<MSetItem> {
    let mut best: HashMap<String, MSetItem> = HashMap::new();
    let mut kept = Vec::with_capacity(items.len());

    for item in items {
        let Some(key) = item.collapse_key.clone() else {
            kept.push(item);
            continue;
        };
        match best.get(&key) {
            Some(current) if !ranks_before(&item, current, sort_forward) => {}
            _ => {
                best.insert(key, item);
            }
        }
    }

    kept.extend(best.into_values());
    kept
}

fn ranks_before(a: &MSetItem, b: &MSetItem, sort_forward: bool) -> bool {
    if a.weight != b.weight {
        return a.weight > b.weight;
    }
    if sort_forward { a.did < b.did } else { a.did > b.did }
}

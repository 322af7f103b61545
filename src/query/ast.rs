use std::collections::HashMap;
use std::fmt;
use serde::{Serialize, Deserialize};
use tracing::debug;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{TermCount, TermPos};

/// Operators of the query algebra
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryOp {
    Leaf,      // Only valid for term nodes
    And,       // All subqueries must match, weights add
    Or,        // Any subquery may match, weights add
    AndNot,    // Left matches and right doesn't
    AndMaybe,  // Left matches, right adds weight where it matches
    Filter,    // Left matches and right matches, only left weighted
    Xor,       // Odd number of subqueries match
}

impl QueryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryOp::Leaf => "LEAF",
            QueryOp::And => "AND",
            QueryOp::Or => "OR",
            QueryOp::AndNot => "AND_NOT",
            QueryOp::AndMaybe => "AND_MAYBE",
            QueryOp::Filter => "FILTER",
            QueryOp::Xor => "XOR",
        }
    }

    /// AND and OR are associative, so same-operator subtrees are spliced
    /// and duplicate leaves merged.
    fn is_associative(&self) -> bool {
        matches!(self, QueryOp::And | QueryOp::Or)
    }
}

impl fmt::Display for QueryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single term occurrence in a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermNode {
    pub tname: String,
    pub wqf: TermCount,       // Within-query frequency
    pub term_pos: TermPos,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum QueryNode {
    Undefined,
    Leaf(TermNode),
    Composite {
        op: QueryOp,
        subqueries: Vec<QueryTree>,
    },
}

/// Recursive query expression.
///
/// Trees are only ever built through the constructors below, which keep
/// three invariants:
/// - a boolean-flagged tree is never nested inside a composite;
/// - `qlen` of a composite is the sum of its defined subqueries' lengths;
/// - AND/OR composites never hold two leaves with the same position and name.
///
/// Deserialization rebuilds the tree through the same constructors, so
/// input breaking these rules is rejected and the length is recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawQueryTree")]
pub struct QueryTree {
    node: QueryNode,
    is_bool: bool,
    qlen: TermCount,
}

/// Wire shape of a `QueryTree`; the serialized `qlen` is ignored
#[derive(Deserialize)]
struct RawQueryTree {
    node: RawQueryNode,
    #[serde(default)]
    is_bool: bool,
}

#[derive(Deserialize)]
enum RawQueryNode {
    Undefined,
    Leaf(TermNode),
    Composite {
        op: QueryOp,
        subqueries: Vec<QueryTree>,
    },
}

impl TryFrom<RawQueryTree> for QueryTree {
    type Error = Error;

    fn try_from(raw: RawQueryTree) -> Result<Self> {
        let mut tree = match raw.node {
            RawQueryNode::Undefined => QueryTree::undefined(),
            RawQueryNode::Leaf(term) => QueryTree::term(term.tname, term.wqf, term.term_pos),
            RawQueryNode::Composite { op, subqueries } => match (op, subqueries.as_slice()) {
                (QueryOp::Leaf, _) => return Err(Error::invalid_argument("Invalid query operation")),
                (QueryOp::And | QueryOp::Or, _) => QueryTree::from_subqueries(op, &subqueries)?,
                (QueryOp::Xor, []) => {
                    QueryTree::combine(op, &QueryTree::undefined(), &QueryTree::undefined())?
                }
                (_, [left, right]) => QueryTree::combine(op, left, right)?,
                _ => {
                    return Err(Error::invalid_argument(format!(
                        "{} takes exactly two subqueries, got {}",
                        op,
                        subqueries.len()
                    )));
                }
            },
        };
        tree.is_bool = raw.is_bool;
        Ok(tree)
    }
}

impl Default for QueryTree {
    fn default() -> Self {
        QueryTree::undefined()
    }
}

impl QueryTree {
    /// The undefined query. Neutral element for AND/OR combination.
    pub fn undefined() -> Self {
        QueryTree {
            node: QueryNode::Undefined,
            is_bool: false,
            qlen: 0,
        }
    }

    pub fn term(tname: impl Into<String>, wqf: TermCount, term_pos: TermPos) -> Self {
        QueryTree {
            node: QueryNode::Leaf(TermNode {
                tname: tname.into(),
                wqf,
                term_pos,
            }),
            is_bool: false,
            qlen: wqf,
        }
    }

    /// Combine two queries under a binary operator
    pub fn combine(op: QueryOp, left: &QueryTree, right: &QueryTree) -> Result<Self> {
        if op == QueryOp::Leaf {
            return Err(Error::invalid_argument("Invalid query operation"));
        }

        if (left.is_defined() && left.is_bool) || (right.is_defined() && right.is_bool) {
            return Err(Error::invalid_argument("Only the top-level query can be bool"));
        }

        if !left.is_defined() || !right.is_defined() {
            return Self::combine_with_undefined(op, left, right);
        }

        let mut subqueries = Vec::with_capacity(2);
        if op.is_associative() {
            for side in [left, right] {
                match &side.node {
                    QueryNode::Composite { op: side_op, subqueries: inner } if *side_op == op => {
                        subqueries.extend(inner.iter().cloned());
                    }
                    _ => subqueries.push(side.clone()),
                }
            }
        } else {
            subqueries.push(left.clone());
            subqueries.push(right.clone());
        }

        let mut tree = QueryTree {
            node: QueryNode::Composite { op, subqueries },
            is_bool: false,
            qlen: left.qlen + right.qlen,
        };
        tree.collapse();

        debug!(op = %op, left = %left, right = %right, result = %tree, "Combined query");
        Ok(tree)
    }

    fn combine_with_undefined(op: QueryOp, left: &QueryTree, right: &QueryTree) -> Result<Self> {
        match op {
            QueryOp::And | QueryOp::Or => {
                if left.is_defined() {
                    Ok(left.clone())
                } else if right.is_defined() {
                    Ok(right.clone())
                } else {
                    Ok(QueryTree::undefined())
                }
            }
            QueryOp::Filter => {
                if left.is_defined() {
                    Ok(left.clone())
                } else if right.is_defined() {
                    // Nothing to weight: the right side becomes a pure boolean query
                    let mut tree = right.clone();
                    tree.is_bool = true;
                    Ok(tree)
                } else {
                    Ok(QueryTree::undefined())
                }
            }
            QueryOp::AndMaybe => {
                if left.is_defined() {
                    Ok(left.clone())
                } else {
                    Ok(QueryTree::undefined())
                }
            }
            QueryOp::AndNot => {
                if left.is_defined() {
                    Ok(left.clone())
                } else if right.is_defined() {
                    Err(Error::invalid_argument("AND NOT can't have an undefined LHS"))
                } else {
                    Ok(QueryTree::undefined())
                }
            }
            QueryOp::Xor => {
                if !left.is_defined() && !right.is_defined() {
                    Ok(QueryTree {
                        node: QueryNode::Composite { op, subqueries: Vec::new() },
                        is_bool: false,
                        qlen: 0,
                    })
                } else {
                    Err(Error::invalid_argument("XOR can't have one undefined argument"))
                }
            }
            QueryOp::Leaf => Err(Error::new(
                ErrorKind::Internal,
                "Leaf operator reached undefined-operand resolution".to_string(),
            )),
        }
    }

    /// Combine any number of queries under AND or OR. Undefined subqueries
    /// are dropped; a single survivor is returned as is.
    pub fn from_subqueries<'a, I>(op: QueryOp, subqueries: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a QueryTree>,
    {
        if !op.is_associative() {
            return Err(Error::invalid_argument("Vector query op must be AND or OR"));
        }

        let subqueries: Vec<&QueryTree> = subqueries.into_iter().collect();
        if subqueries.iter().any(|q| q.is_bool) {
            return Err(Error::invalid_argument("Only the top-level query can be bool"));
        }

        let mut defined: Vec<QueryTree> = subqueries
            .into_iter()
            .filter(|q| q.is_defined())
            .cloned()
            .collect();
        let qlen = defined.iter().map(|q| q.qlen).sum();

        match defined.len() {
            0 => Ok(QueryTree::undefined()),
            1 => Ok(defined.remove(0)),
            _ => {
                let mut tree = QueryTree {
                    node: QueryNode::Composite { op, subqueries: defined },
                    is_bool: false,
                    qlen,
                };
                tree.collapse();
                Ok(tree)
            }
        }
    }

    /// Combine a list of term names under AND or OR. Each name becomes a
    /// leaf with wqf 1, positioned at its index in the list.
    pub fn from_terms<I, S>(op: QueryOp, tnames: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let leaves: Vec<QueryTree> = tnames
            .into_iter()
            .enumerate()
            .map(|(pos, tname)| QueryTree::term(tname, 1, pos as TermPos))
            .collect();
        Self::from_subqueries(op, &leaves)
    }

    /// Merge duplicate leaves of an AND/OR composite, then absorb a lone
    /// remaining subquery.
    fn collapse(&mut self) {
        let merged = match &mut self.node {
            QueryNode::Composite { op, subqueries } if op.is_associative() => {
                merge_duplicate_leaves(std::mem::take(subqueries))
            }
            _ => return,
        };

        debug_assert!(!merged.is_empty(), "collapse removed every subquery");

        if merged.len() == 1 {
            if let Some(only) = merged.into_iter().next() {
                *self = only;
            }
        } else if let QueryNode::Composite { subqueries, .. } = &mut self.node {
            *subqueries = merged;
        }
    }

    pub fn is_defined(&self) -> bool {
        !matches!(self.node, QueryNode::Undefined)
    }

    pub fn is_bool(&self) -> bool {
        self.is_bool
    }

    /// Returns the previous value
    pub fn set_bool(&mut self, is_bool: bool) -> bool {
        std::mem::replace(&mut self.is_bool, is_bool)
    }

    pub fn length(&self) -> TermCount {
        self.qlen
    }

    /// Returns the previous value
    pub fn set_length(&mut self, qlen: TermCount) -> TermCount {
        std::mem::replace(&mut self.qlen, qlen)
    }

    pub fn node(&self) -> &QueryNode {
        &self.node
    }

    /// Operator at the root, `None` for the undefined query
    pub fn op(&self) -> Option<QueryOp> {
        match &self.node {
            QueryNode::Undefined => None,
            QueryNode::Leaf(_) => Some(QueryOp::Leaf),
            QueryNode::Composite { op, .. } => Some(*op),
        }
    }

    pub fn subqueries(&self) -> &[QueryTree] {
        match &self.node {
            QueryNode::Composite { subqueries, .. } => subqueries,
            _ => &[],
        }
    }

    /// Distinct term names ordered by position, then name
    pub fn terms(&self) -> Vec<String> {
        let mut terms: Vec<(TermPos, &str)> = Vec::new();
        if self.is_defined() {
            self.accumulate_terms(&mut terms);
        }

        terms.sort_unstable();
        terms.dedup();

        terms.into_iter().map(|(_, tname)| tname.to_string()).collect()
    }

    fn accumulate_terms<'a>(&'a self, terms: &mut Vec<(TermPos, &'a str)>) {
        match &self.node {
            QueryNode::Undefined => {}
            QueryNode::Leaf(term) => terms.push((term.term_pos, term.tname.as_str())),
            QueryNode::Composite { subqueries, .. } => {
                for subquery in subqueries {
                    subquery.accumulate_terms(terms);
                }
            }
        }
    }

    pub fn description(&self) -> String {
        self.to_string()
    }
}

fn merge_duplicate_leaves(subqueries: Vec<QueryTree>) -> Vec<QueryTree> {
    let mut seen: HashMap<(TermPos, String), usize> = HashMap::new();
    let mut merged: Vec<QueryTree> = Vec::with_capacity(subqueries.len());

    for subquery in subqueries {
        if let QueryNode::Leaf(term) = &subquery.node {
            let key = (term.term_pos, term.tname.clone());
            if let Some(&idx) = seen.get(&key) {
                let wqf = term.wqf;
                if let QueryNode::Leaf(survivor) = &mut merged[idx].node {
                    survivor.wqf += wqf;
                }
                merged[idx].qlen += wqf;
                continue;
            }
            seen.insert(key, merged.len());
        }
        merged.push(subquery);
    }

    merged
}

impl fmt::Display for QueryTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.node {
            QueryNode::Undefined => f.write_str("<NULL>"),
            QueryNode::Leaf(term) => f.write_str(&term.tname),
            QueryNode::Composite { op, subqueries } => {
                f.write_str("(")?;
                for (i, subquery) in subqueries.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", op)?;
                    }
                    write!(f, "{}", subquery)?;
                }
                f.write_str(")")
            }
        }
    }
}

use std::collections::HashSet;
use crate::core::types::Document;

/// Accepts or rejects candidate terms during expansion
pub trait ExpandDecider: Send + Sync {
    fn accept(&self, tname: &str) -> bool;
}

impl<F> ExpandDecider for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn accept(&self, tname: &str) -> bool {
        self(tname)
    }
}

/// Accepts every term
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpandDeciderAlways;

impl ExpandDecider for ExpandDeciderAlways {
    fn accept(&self, _tname: &str) -> bool {
        true
    }
}

/// Rejects the terms it was built from
#[derive(Debug, Clone, Default)]
pub struct ExpandDeciderFilterTerms {
    terms: HashSet<String>,
}

impl ExpandDeciderFilterTerms {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ExpandDeciderFilterTerms {
            terms: terms.into_iter().map(Into::into).collect(),
        }
    }
}

impl ExpandDecider for ExpandDeciderFilterTerms {
    fn accept(&self, tname: &str) -> bool {
        !self.terms.contains(tname)
    }
}

/// Accepts a term only if both deciders do
pub struct ExpandDeciderAnd<'a> {
    left: &'a dyn ExpandDecider,
    right: &'a dyn ExpandDecider,
}

impl<'a> ExpandDeciderAnd<'a> {
    pub fn new(left: &'a dyn ExpandDecider, right: &'a dyn ExpandDecider) -> Self {
        ExpandDeciderAnd { left, right }
    }
}

impl ExpandDecider for ExpandDeciderAnd<'_> {
    fn accept(&self, tname: &str) -> bool {
        self.left.accept(tname) && self.right.accept(tname)
    }
}

/// Accepts or rejects candidate documents during matching
pub trait MatchDecider: Send + Sync {
    fn accept(&self, doc: &Document) -> bool;
}

impl<F> MatchDecider for F
where
    F: Fn(&Document) -> bool + Send + Sync,
{
    fn accept(&self, doc: &Document) -> bool {
        self(doc)
    }
}

use serde::{Serialize, Deserialize};
use crate::core::error::{Error, Result};
use crate::core::types::KeyNo;

/// Options controlling a match run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOptions {
    collapse_key: Option<KeyNo>,
    sort_forward: bool,          // Ascending document id among equal weights
    percent_cutoff: Option<u8>,
}

impl Default for MatchOptions {
    fn default() -> Self {
        MatchOptions {
            collapse_key: None,
            sort_forward: true,
            percent_cutoff: None,
        }
    }
}

impl MatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most one document per value of key `keyno`
    pub fn set_collapse_key(&mut self, keyno: KeyNo) {
        self.collapse_key = Some(keyno);
    }

    pub fn set_no_collapse(&mut self) {
        self.collapse_key = None;
    }

    pub fn set_sort_forward(&mut self, forward: bool) {
        self.sort_forward = forward;
    }

    /// Drop matches scoring below `percent` of the maximum possible weight
    pub fn set_percentage_cutoff(&mut self, percent: i32) -> Result<()> {
        if (0..=100).contains(&percent) {
            self.percent_cutoff = Some(percent as u8);
            Ok(())
        } else {
            Err(Error::invalid_argument("Percent cutoff must be in 0..100"))
        }
    }

    pub fn do_collapse(&self) -> bool {
        self.collapse_key.is_some()
    }

    pub fn collapse_key(&self) -> Option<KeyNo> {
        self.collapse_key
    }

    pub fn sort_forward(&self) -> bool {
        self.sort_forward
    }

    pub fn percent_cutoff(&self) -> Option<u8> {
        self.percent_cutoff
    }
}

/// Options controlling an expand run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpandOptions {
    allow_query_terms: bool,
}

impl ExpandOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether terms of the current query may be suggested
    pub fn use_query_terms(&mut self, allow_query_terms: bool) {
        self.allow_query_terms = allow_query_terms;
    }

    pub fn allow_query_terms(&self) -> bool {
        self.allow_query_terms
    }
}

use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;
use std::fmt;

pub type TermCount = u32;
pub type TermPos = u32;
pub type DocCount = u32;
pub type KeyNo = u32;
pub type Weight = f64;

/// Document identifier. Backends number documents from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocId(pub u32);

impl DocId {
    pub fn new(id: u32) -> Self {
        DocId(id)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl From<u32> for DocId {
    fn from(id: u32) -> Self {
        DocId(id)
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stored document as returned by a backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub data: String,
    pub keys: BTreeMap<KeyNo, String>,  // Values usable as collapse keys
}

impl Document {
    pub fn new(id: DocId) -> Self {
        Document {
            id,
            data: String::new(),
            keys: BTreeMap::new(),
        }
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = data.into();
        self
    }

    pub fn add_key(&mut self, keyno: KeyNo, value: String) {
        self.keys.insert(keyno, value);
    }

    pub fn get_key(&self, keyno: KeyNo) -> Option<&str> {
        self.keys.get(&keyno).map(String::as_str)
    }
}

pub mod core;
pub mod index;
pub mod scoring;
pub mod search;
pub mod query;

pub use crate::core::config::Config;
pub use crate::core::database::Database;
pub use crate::core::error::{Error, ErrorKind, Result};
pub use crate::core::types::{DocId, Document};
pub use crate::query::ast::QueryOp;
pub use crate::query::handle::Query;
pub use crate::search::enquire::Enquire;
pub use crate::search::options::{ExpandOptions, MatchOptions};
pub use crate::search::results::{ESet, MSet};
pub use crate::search::rset::RelevanceSet;

/*
┌──────────────────────────────── ENQUIRE LAYERS ────────────────────────────────┐
│                                                                                 │
│  query::handle::Query ── Mutex<QueryTree>                                       │
│        │                                                                        │
│        ▼ set_query (snapshot)                                                   │
│  search::enquire::Enquire ── Mutex<{ database?, Database, QueryTree? }>         │
│        │                                                                        │
│        ├── open_database ──► index::builder::BackendOpener                      │
│        │                        ├── inmemory ─► InMemoryBackend (JSON)          │
│        │                        └── multidb ──► MultiBackend (rayon open)       │
│        │                                                                        │
│        ├── mset ──► search::matcher::LeafMatch                                  │
│        │              ├── weighted: BM25Scorer + MSetCollector (top-k heap)     │
│        │              └── boolean:  RoaringBitmap set algebra                   │
│        │                                                                        │
│        ├── eset ──► search::expand::Expand  (RSet + ExpandDecider chain)        │
│        │                                                                        │
│        └── document / matching_terms ──► Backend::open_document / term list     │
│                                                                                 │
└─────────────────────────────────────────────────────────────────────────────────┘
*/

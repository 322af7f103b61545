use std::fmt;
use serde::{Serialize, Deserialize};

/// Kinds of database a parameter record can describe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatabaseType {
    Null,              // Unrecognised name
    Muscat36DaFlimsy,
    Muscat36DaHeavy,
    Muscat36DbFlimsy,
    Muscat36DbHeavy,
    InMemory,
    Multi,
    Sleepycat,
}

/// Canonical type names
static DATABASE_TYPES: &[(&str, DatabaseType)] = &[
    ("da_flimsy", DatabaseType::Muscat36DaFlimsy),
    ("da_heavy", DatabaseType::Muscat36DaHeavy),
    ("db_flimsy", DatabaseType::Muscat36DbFlimsy),
    ("db_heavy", DatabaseType::Muscat36DbHeavy),
    ("inmemory", DatabaseType::InMemory),
    ("multidb", DatabaseType::Multi),
    ("sleepycat", DatabaseType::Sleepycat),
];

impl DatabaseType {
    /// Unknown names map to `Null`; the failure surfaces when the database is opened
    pub fn from_name(name: &str) -> Self {
        DATABASE_TYPES
            .iter()
            .find(|(type_name, _)| *type_name == name)
            .map(|(_, db_type)| *db_type)
            .unwrap_or(DatabaseType::Null)
    }

    pub fn name(&self) -> &'static str {
        DATABASE_TYPES
            .iter()
            .find(|(_, db_type)| db_type == self)
            .map(|(type_name, _)| *type_name)
            .unwrap_or("")
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DatabaseType::Null => f.write_str("<null>"),
            other => f.write_str(other.name()),
        }
    }
}

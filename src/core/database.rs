use serde::{Serialize, Deserialize};
use tracing::warn;
use crate::index::registry::DatabaseType;

/// Everything needed to construct one backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseParams {
    pub db_type: DatabaseType,
    pub readonly: bool,
    pub paths: Vec<String>,
    pub subdbs: Vec<DatabaseParams>,  // Only used by multi databases
}

impl DatabaseParams {
    pub fn new(db_type: DatabaseType, readonly: bool) -> Self {
        DatabaseParams {
            db_type,
            readonly,
            paths: Vec::new(),
            subdbs: Vec::new(),
        }
    }

    pub fn multi(subdbs: Vec<DatabaseParams>) -> Self {
        DatabaseParams {
            subdbs,
            ..DatabaseParams::new(DatabaseType::Multi, true)
        }
    }
}

/// Declarative list of the databases a search runs over.
///
/// Nothing is opened here; an `Enquire` builds the backend on first use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Database {
    params: Vec<DatabaseParams>,
}

impl Database {
    pub fn new() -> Self {
        Database { params: Vec::new() }
    }

    /// Register a database by type name. Databases are opened read-only.
    pub fn add_database<I, S>(&mut self, type_name: &str, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let db_type = DatabaseType::from_name(type_name);
        if db_type == DatabaseType::Null {
            warn!(type_name, "Unknown database type registered");
        }

        let mut params = DatabaseParams::new(db_type, true);
        params.paths = paths.into_iter().map(Into::into).collect();
        self.params.push(params);
    }

    pub fn params(&self) -> &[DatabaseParams] {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_database() {
        let mut db = Database::new();
        assert!(db.is_empty());

        db.add_database("inmemory", ["a.json", "b.json"]);
        db.add_database("nonsense", Vec::<String>::new());

        assert_eq!(db.len(), 2);
        assert_eq!(db.params()[0].db_type, DatabaseType::InMemory);
        assert_eq!(db.params()[0].paths, vec!["a.json", "b.json"]);
        assert!(db.params()[0].readonly);
        assert_eq!(db.params()[1].db_type, DatabaseType::Null);
    }

    #[test]
    fn test_clone_is_deep() {
        let mut db = Database::new();
        db.add_database("inmemory", ["a.json"]);
        let copy = db.clone();
        db.add_database("inmemory", ["b.json"]);

        assert_eq!(copy.len(), 1);
        assert_eq!(db.len(), 2);
    }

    #[test]
    fn test_multi_params() {
        let mut db = Database::new();
        db.add_database("inmemory", ["a.json"]);
        db.add_database("inmemory", ["b.json"]);
        let multi = DatabaseParams::multi(db.params().to_vec());
        assert_eq!(multi.db_type, DatabaseType::Multi);
        assert_eq!(multi.subdbs.len(), 2);
        assert!(multi.paths.is_empty());
    }
}

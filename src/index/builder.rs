use std::sync::Arc;
use rayon::prelude::*;
use tracing::{debug, info};
use crate::core::database::DatabaseParams;
use crate::core::error::{Error, ErrorKind, Result};
use crate::index::backend::Backend;
use crate::index::inverted::InMemoryBackend;
use crate::index::multi::MultiBackend;
use crate::index::registry::DatabaseType;

/// Turns a parameter record into an opened backend
pub trait BackendOpener: Send + Sync {
    fn open(&self, params: &DatabaseParams) -> Result<Arc<dyn Backend>>;
}

/// Opens the backends compiled into this crate
#[derive(Debug, Clone)]
pub struct DatabaseBuilder {
    pub parallel_open: bool,
}

impl DatabaseBuilder {
    pub fn new(parallel_open: bool) -> Self {
        DatabaseBuilder { parallel_open }
    }

    fn open_multi(&self, subdbs: &[DatabaseParams]) -> Result<Arc<dyn Backend>> {
        let databases: Vec<Arc<dyn Backend>> = if self.parallel_open {
            subdbs.par_iter().map(|params| self.open(params)).collect::<Result<_>>()?
        } else {
            subdbs.iter().map(|params| self.open(params)).collect::<Result<_>>()?
        };

        let multi = MultiBackend::new(databases)?;
        info!(databases = multi.database_count(), docs = multi.doc_count(), "Opened multi database");
        Ok(Arc::new(multi))
    }
}

impl Default for DatabaseBuilder {
    fn default() -> Self {
        DatabaseBuilder::new(true)
    }
}

impl BackendOpener for DatabaseBuilder {
    fn open(&self, params: &DatabaseParams) -> Result<Arc<dyn Backend>> {
        debug!(db_type = %params.db_type, paths = ?params.paths, "Opening database");
        match params.db_type {
            DatabaseType::InMemory => {
                let backend = InMemoryBackend::from_json_files(params.paths.as_slice())?;
                info!(docs = backend.doc_count(), "Opened in-memory database");
                Ok(Arc::new(backend))
            }
            DatabaseType::Multi => self.open_multi(&params.subdbs),
            DatabaseType::Null => Err(Error::invalid_argument("Unknown database type")),
            other => Err(Error::new(
                ErrorKind::FeatureUnavailable,
                format!("Database type {} is not available in this build", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use crate::core::database::Database;

    fn json_db(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", body).unwrap();
        file
    }

    fn path_of(file: &tempfile::NamedTempFile) -> String {
        file.path().to_string_lossy().into_owned()
    }

    #[test]
    fn test_open_inmemory() {
        let file = json_db(r#"[{"terms": ["a"]}, {"terms": ["b"]}]"#);
        let mut db = Database::new();
        db.add_database("inmemory", [path_of(&file)]);

        let backend = DatabaseBuilder::default().open(&db.params()[0]).unwrap();
        assert_eq!(backend.doc_count(), 2);
    }

    #[test]
    fn test_open_multi_sequential_and_parallel() {
        let first = json_db(r#"[{"terms": ["a"]}]"#);
        let second = json_db(r#"[{"terms": ["a", "b"]}, {"terms": ["c"]}]"#);
        let mut db = Database::new();
        db.add_database("inmemory", [path_of(&first)]);
        db.add_database("inmemory", [path_of(&second)]);
        let params = DatabaseParams::multi(db.params().to_vec());

        for parallel in [false, true] {
            let backend = DatabaseBuilder::new(parallel).open(&params).unwrap();
            assert_eq!(backend.doc_count(), 3);
            assert_eq!(backend.term_freq("a"), 2);
        }
    }

    #[test]
    fn test_unknown_and_unavailable_types() {
        let null = DatabaseParams::new(DatabaseType::Null, true);
        let err = DatabaseBuilder::default().open(&null).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let sleepy = DatabaseParams::new(DatabaseType::Sleepycat, true);
        let err = DatabaseBuilder::default().open(&sleepy).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::FeatureUnavailable);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let mut params = DatabaseParams::new(DatabaseType::InMemory, true);
        params.paths.push("/nonexistent/enquire/db.json".to_string());
        let err = DatabaseBuilder::default().open(&params).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}

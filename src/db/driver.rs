//! Backend selection
//!
//! Maps the `--driver` flag to a constructor. Scenarios only see the
//! `DbFactory` trait, so every worker can open its own handle.

use crate::db::cached::CachedSqliteDb;
use crate::db::sqlite::SqliteDb;
use crate::db::{Db, DbFactory};
use crate::error::DbResult;
use std::path::Path;

/// Available database drivers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Driver {
    /// rusqlite, statements compiled per call, bulk insert supported
    #[default]
    #[value(name = "rusqlite")]
    Rusqlite,

    /// rusqlite with the connection statement cache, no bulk insert
    #[value(name = "rusqlite_cached")]
    RusqliteCached,
}

impl Driver {
    /// Name reported in result lines
    pub fn name(self) -> &'static str {
        match self {
            Driver::Rusqlite => SqliteDb::DRIVER_NAME,
            Driver::RusqliteCached => CachedSqliteDb::DRIVER_NAME,
        }
    }
}

impl DbFactory for Driver {
    fn open(&self, path: &Path) -> DbResult<Box<dyn Db>> {
        let db: Box<dyn Db> = match self {
            Driver::Rusqlite => Box::new(SqliteDb::open(path)?),
            Driver::RusqliteCached => Box::new(CachedSqliteDb::open(path)?),
        };
        Ok(db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_driver_names_match_handles() {
        let dir = tempdir().unwrap();
        for driver in [Driver::Rusqlite, Driver::RusqliteCached] {
            let db = driver.open(&dir.path().join("d.db")).unwrap();
            assert_eq!(db.driver_name(), driver.name());
            db.close().unwrap();
        }
    }

    #[test]
    fn test_open_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let err = Driver::Rusqlite
            .open(&dir.path().join("missing").join("d.db"))
            .err()
            .unwrap();
        assert_eq!(err.kind(), crate::error::ErrorKind::Connection);
    }
}

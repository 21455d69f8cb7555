//! Database file housekeeping
//!
//! Every scenario starts by removing the database file together with the
//! journal and WAL companions SQLite may have left next to it.

use crate::error::{BenchError, Result};
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Suffixes of the files SQLite creates next to the main database file
const COMPANION_SUFFIXES: &[&str] = &["-journal", "-wal", "-shm"];

/// Remove the database file and its companions; missing files are fine
pub fn remove_db_files(path: &Path) -> Result<()> {
    remove_if_exists(path)?;
    for suffix in COMPANION_SUFFIXES {
        remove_if_exists(&companion(path, suffix))?;
    }
    Ok(())
}

/// Size in bytes of the main database file
pub fn db_size(path: &Path) -> Result<u64> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|source| BenchError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn companion(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(BenchError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_remove_db_files() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("bench.db");
        fs::write(&db, b"main").unwrap();
        fs::write(companion(&db, "-wal"), b"wal").unwrap();
        fs::write(companion(&db, "-shm"), b"shm").unwrap();

        remove_db_files(&db).unwrap();

        assert!(!db.exists());
        assert!(!dir.path().join("bench.db-wal").exists());
        assert!(!dir.path().join("bench.db-shm").exists());

        // Second call finds nothing and still succeeds
        remove_db_files(&db).unwrap();
    }

    #[test]
    fn test_db_size() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("bench.db");
        fs::write(&db, vec![0u8; 4096]).unwrap();
        assert_eq!(db_size(&db).unwrap(), 4096);

        let err = db_size(&dir.path().join("missing.db")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }
}

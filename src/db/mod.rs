//! Database capability interface and its SQLite backends
//!
//! Scenarios talk to a database only through [`Db`]. Backends that can do
//! batched multi-row inserts additionally expose [`BulkDb`], discovered at
//! run time with [`Db::as_bulk`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │              Scenarios / WAL Workers                    │
//! │  - one Box<dyn Db> per thread, opened via DbFactory     │
//! └─────────────────────┬───────────────────────────────────┘
//!                       │ Db / BulkDb
//!                       ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │     SqliteDb (rusqlite)   │   CachedSqliteDb            │
//! │  - row-by-row inserts     │  - statement cache          │
//! │  - bulk::bulk_insert      │  - no bulk capability       │
//! │  - join::JoinFlattener    │                             │
//! └─────────────────────┬───────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │              SQLite file (+ -wal / -shm)                │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod bulk;
pub mod cached;
pub mod driver;
pub mod files;
pub mod join;
pub mod row;
pub mod schema;
pub mod sqlite;

pub use bulk::{bulk_insert, plan_batches, BatchSize, BulkStats};
pub use cached::CachedSqliteDb;
pub use driver::Driver;
pub use files::{db_size, remove_db_files};
pub use join::{flatten, JoinFlattener};
pub use schema::Journal;
pub use sqlite::SqliteDb;

use crate::error::{DbError, DbResult};
use crate::model::{Article, Comment, Graph, User};
use std::path::Path;

/// Operations every backend provides
///
/// A handle is owned by exactly one thread; concurrent scenarios open one
/// handle per worker.
pub trait Db: Send {
    /// Name reported next to every result
    fn driver_name(&self) -> &str;

    /// Run DDL/PRAGMA statements in order
    fn exec(&mut self, statements: &[&str]) -> DbResult<()>;

    /// Insert rows one statement execution at a time, in one transaction
    fn insert_users(&mut self, sql: &str, users: &[User]) -> DbResult<()>;

    fn insert_articles(&mut self, sql: &str, articles: &[Article]) -> DbResult<()>;

    fn insert_comments(&mut self, sql: &str, comments: &[Comment]) -> DbResult<()>;

    fn find_users(&self, sql: &str) -> DbResult<Vec<User>>;

    fn find_articles(&self, sql: &str) -> DbResult<Vec<Article>>;

    /// Run a users/articles/comments join and deduplicate each entity
    fn find_users_articles_comments(&self, sql: &str) -> DbResult<Graph>;

    /// Close the connection
    fn close(self: Box<Self>) -> DbResult<()>;

    /// Bulk insert capability, if this backend has one
    fn as_bulk(&mut self) -> Option<&mut dyn BulkDb> {
        None
    }
}

/// Optional batched insert capability
pub trait BulkDb {
    /// Insert users with the batched strategy; `template` contains one `%s`
    fn insert_users_bulk(&mut self, template: &str, users: &[User]) -> DbResult<BulkStats>;
}

/// Bulk capability of `db`, or an error naming the driver
pub fn require_bulk(db: &mut dyn Db) -> DbResult<&mut dyn BulkDb> {
    let driver = db.driver_name().to_string();
    db.as_bulk().ok_or(DbError::BulkUnsupported { driver })
}

/// Opens database handles; shared by all workers of a scenario
pub trait DbFactory: Sync {
    fn open(&self, path: &Path) -> DbResult<Box<dyn Db>>;
}

impl<F> DbFactory for F
where
    F: Fn(&Path) -> DbResult<Box<dyn Db>> + Sync,
{
    fn open(&self, path: &Path) -> DbResult<Box<dyn Db>> {
        self(path)
    }
}

//! rusqlite backend that reuses compiled statements
//!
//! Every statement goes through the connection's statement cache, so a
//! query issued many times (the read-heavy scenario) is compiled once per
//! connection. This backend has no bulk insert capability.

use crate::db::sqlite::{exec_all, insert_rows, open_connection, query_graph, query_rows, Prepare};
use crate::db::Db;
use crate::error::{DbError, DbResult};
use crate::model::{Article, Comment, Graph, User};
use rusqlite::Connection;
use std::path::Path;

/// Statement cache capacity per connection
const STATEMENT_CACHE_CAPACITY: usize = 64;

/// Database handle whose statements live in the connection cache
pub struct CachedSqliteDb {
    conn: Connection,
}

impl CachedSqliteDb {
    pub const DRIVER_NAME: &'static str = "rusqlite_cached";

    pub fn open(path: &Path) -> DbResult<Self> {
        let conn = open_connection(path)?;
        conn.set_prepared_statement_cache_capacity(STATEMENT_CACHE_CAPACITY);
        Ok(Self { conn })
    }
}

impl Db for CachedSqliteDb {
    fn driver_name(&self) -> &str {
        Self::DRIVER_NAME
    }

    fn exec(&mut self, statements: &[&str]) -> DbResult<()> {
        exec_all(&self.conn, statements)
    }

    fn insert_users(&mut self, sql: &str, users: &[User]) -> DbResult<()> {
        insert_rows(&mut self.conn, sql, users, Prepare::Cached)
    }

    fn insert_articles(&mut self, sql: &str, articles: &[Article]) -> DbResult<()> {
        insert_rows(&mut self.conn, sql, articles, Prepare::Cached)
    }

    fn insert_comments(&mut self, sql: &str, comments: &[Comment]) -> DbResult<()> {
        insert_rows(&mut self.conn, sql, comments, Prepare::Cached)
    }

    fn find_users(&self, sql: &str) -> DbResult<Vec<User>> {
        query_rows(&self.conn, sql, Prepare::Cached)
    }

    fn find_articles(&self, sql: &str) -> DbResult<Vec<Article>> {
        query_rows(&self.conn, sql, Prepare::Cached)
    }

    fn find_users_articles_comments(&self, sql: &str) -> DbResult<Graph> {
        query_graph(&self.conn, sql, Prepare::Cached)
    }

    fn close(self: Box<Self>) -> DbResult<()> {
        self.conn.flush_prepared_statement_cache();
        self.conn.close().map_err(|(_, e)| DbError::Close(e))
    }
}

//! rusqlite backend
//!
//! Statements are compiled per call inside the call's transaction and
//! finalized before commit. This backend also provides the batched bulk
//! insert capability.

use crate::db::bulk::{self, BulkStats};
use crate::db::join::JoinFlattener;
use crate::db::row::{BindRow, Columns, Decode};
use crate::db::{BulkDb, Db};
use crate::error::{DbError, DbResult};
use crate::model::{Article, Comment, Graph, User};
use rusqlite::types::ToSqlOutput;
use rusqlite::{params_from_iter, Connection, Statement};
use std::path::Path;

/// Whether statements come from the connection's cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Prepare {
    Fresh,
    Cached,
}

/// Open a connection, tagging failures with the path
pub(crate) fn open_connection(path: &Path) -> DbResult<Connection> {
    Connection::open(path).map_err(|source| DbError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Run each statement in order, stopping at the first failure
pub(crate) fn exec_all(conn: &Connection, statements: &[&str]) -> DbResult<()> {
    for sql in statements {
        conn.execute_batch(sql).map_err(DbError::exec(sql))?;
    }
    Ok(())
}

/// Row-by-row insert: one transaction, one statement, one execution per row
pub(crate) fn insert_rows<T: BindRow>(
    conn: &mut Connection,
    sql: &str,
    rows: &[T],
    prepare: Prepare,
) -> DbResult<()> {
    let tx = conn.transaction().map_err(DbError::transaction("begin"))?;

    match prepare {
        Prepare::Fresh => {
            let mut stmt = tx.prepare(sql).map_err(DbError::prepare(sql))?;
            execute_each(&mut stmt, sql, rows)?;
            stmt.finalize().map_err(DbError::Finalize)?;
        }
        Prepare::Cached => {
            let mut stmt = tx.prepare_cached(sql).map_err(DbError::prepare(sql))?;
            execute_each(&mut stmt, sql, rows)?;
        }
    }

    tx.commit().map_err(DbError::transaction("commit"))
}

fn execute_each<T: BindRow>(stmt: &mut Statement<'_>, sql: &str, rows: &[T]) -> DbResult<()> {
    let mut args: Vec<ToSqlOutput<'_>> = Vec::with_capacity(T::COLUMNS);
    for row in rows {
        args.clear();
        row.bind(&mut args);
        stmt.execute(params_from_iter(args.iter()))
            .map_err(DbError::exec(sql))?;
    }
    Ok(())
}

/// Query and decode every row
pub(crate) fn query_rows<T: Decode>(
    conn: &Connection,
    sql: &str,
    prepare: Prepare,
) -> DbResult<Vec<T>> {
    match prepare {
        Prepare::Fresh => {
            let mut stmt = conn.prepare(sql).map_err(DbError::prepare(sql))?;
            collect_rows(&mut stmt, sql)
        }
        Prepare::Cached => {
            let mut stmt = conn.prepare_cached(sql).map_err(DbError::prepare(sql))?;
            collect_rows(&mut stmt, sql)
        }
    }
}

fn collect_rows<T: Decode>(stmt: &mut Statement<'_>, sql: &str) -> DbResult<Vec<T>> {
    let mut rows = stmt.query([]).map_err(DbError::exec(sql))?;
    let mut out = Vec::new();
    while let Some(row) = rows.next().map_err(DbError::Scan)? {
        out.push(T::decode(row, 0)?);
    }
    Ok(out)
}

/// Query a users × articles × comments join and deduplicate it
pub(crate) fn query_graph(conn: &Connection, sql: &str, prepare: Prepare) -> DbResult<Graph> {
    match prepare {
        Prepare::Fresh => {
            let mut stmt = conn.prepare(sql).map_err(DbError::prepare(sql))?;
            collect_graph(&mut stmt, sql)
        }
        Prepare::Cached => {
            let mut stmt = conn.prepare_cached(sql).map_err(DbError::prepare(sql))?;
            collect_graph(&mut stmt, sql)
        }
    }
}

fn collect_graph(stmt: &mut Statement<'_>, sql: &str) -> DbResult<Graph> {
    let mut rows = stmt.query([]).map_err(DbError::exec(sql))?;
    let mut flattener = JoinFlattener::new();
    while let Some(row) = rows.next().map_err(DbError::Scan)? {
        let user = User::decode(row, 0)?;
        let article = Article::decode(row, User::COLUMNS)?;
        let comment = Comment::decode(row, User::COLUMNS + Article::COLUMNS)?;
        flattener.push(user, article, comment);
    }
    Ok(flattener.finish())
}

/// Database handle backed by a single rusqlite connection
pub struct SqliteDb {
    conn: Connection,
}

impl SqliteDb {
    pub const DRIVER_NAME: &'static str = "rusqlite";

    /// Open (or create) the database file
    pub fn open(path: &Path) -> DbResult<Self> {
        Ok(Self {
            conn: open_connection(path)?,
        })
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory().map_err(|source| DbError::Open {
            path: ":memory:".into(),
            source,
        })?;
        Ok(Self { conn })
    }

    /// Underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}

impl Db for SqliteDb {
    fn driver_name(&self) -> &str {
        Self::DRIVER_NAME
    }

    fn exec(&mut self, statements: &[&str]) -> DbResult<()> {
        exec_all(&self.conn, statements)
    }

    fn insert_users(&mut self, sql: &str, users: &[User]) -> DbResult<()> {
        insert_rows(&mut self.conn, sql, users, Prepare::Fresh)
    }

    fn insert_articles(&mut self, sql: &str, articles: &[Article]) -> DbResult<()> {
        insert_rows(&mut self.conn, sql, articles, Prepare::Fresh)
    }

    fn insert_comments(&mut self, sql: &str, comments: &[Comment]) -> DbResult<()> {
        insert_rows(&mut self.conn, sql, comments, Prepare::Fresh)
    }

    fn find_users(&self, sql: &str) -> DbResult<Vec<User>> {
        query_rows(&self.conn, sql, Prepare::Fresh)
    }

    fn find_articles(&self, sql: &str) -> DbResult<Vec<Article>> {
        query_rows(&self.conn, sql, Prepare::Fresh)
    }

    fn find_users_articles_comments(&self, sql: &str) -> DbResult<Graph> {
        query_graph(&self.conn, sql, Prepare::Fresh)
    }

    fn close(self: Box<Self>) -> DbResult<()> {
        self.conn.close().map_err(|(_, e)| DbError::Close(e))
    }

    fn as_bulk(&mut self) -> Option<&mut dyn BulkDb> {
        Some(self)
    }
}

impl BulkDb for SqliteDb {
    fn insert_users_bulk(&mut self, template: &str, users: &[User]) -> DbResult<BulkStats> {
        bulk::bulk_insert(&mut self.conn, template, users)
    }
}

//! Batched multi-row insert
//!
//! Rows are consumed front to back in batches of 100, then 10, then 1. Each
//! batch size gets its own multi-row `INSERT ... VALUES (..),(..)` statement,
//! compiled the first time that size is needed and reused afterwards, so a
//! call compiles at most three statements no matter how many rows it
//! inserts. All batches run inside one transaction.
//!
//! # Statement lifecycle
//!
//! ```text
//!   BEGIN
//!     ├── prepare(100) ── execute × n/100
//!     ├── prepare(10)  ── execute × (n%100)/10
//!     ├── prepare(1)   ── execute × n%10
//!     └── finalize(1, 10, 100)
//!   COMMIT
//! ```
//!
//! Finalizing a statement in SQLite does not end the enclosing transaction;
//! this is checked on every call before commit.

use crate::db::row::BindRow;
use crate::error::{DbError, DbResult};
use rusqlite::types::ToSqlOutput;
use rusqlite::{params_from_iter, Connection, Statement};
use tracing::debug;

/// Placeholder in the insert template replaced by the value tuples
pub const VALUES_PLACEHOLDER: &str = "%s";

/// The batch sizes the planner emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BatchSize {
    One,
    Ten,
    Hundred,
}

impl BatchSize {
    /// Rows consumed by one batch of this size
    pub fn rows(self) -> usize {
        match self {
            BatchSize::One => 1,
            BatchSize::Ten => 10,
            BatchSize::Hundred => 100,
        }
    }

    /// Largest batch that fits in `remaining` rows
    pub fn for_remaining(remaining: usize) -> Option<Self> {
        match remaining {
            0 => None,
            1..=9 => Some(BatchSize::One),
            10..=99 => Some(BatchSize::Ten),
            _ => Some(BatchSize::Hundred),
        }
    }

    fn slot(self) -> usize {
        match self {
            BatchSize::One => 0,
            BatchSize::Ten => 1,
            BatchSize::Hundred => 2,
        }
    }
}

/// Sequence of batch sizes used to insert `n` rows
pub fn plan_batches(n: usize) -> impl Iterator<Item = BatchSize> {
    let mut remaining = n;
    std::iter::from_fn(move || {
        let size = BatchSize::for_remaining(remaining)?;
        remaining -= size.rows();
        Some(size)
    })
}

/// Expand the template for `rows` tuples of `columns` parameters each
pub fn render_sql(template: &str, columns: usize, rows: usize) -> DbResult<String> {
    if !template.contains(VALUES_PLACEHOLDER) {
        return Err(DbError::InvalidTemplate {
            template: template.to_string(),
        });
    }
    let tuple = format!("({})", vec!["?"; columns].join(","));
    let values = vec![tuple.as_str(); rows].join(",");
    Ok(template.replacen(VALUES_PLACEHOLDER, &values, 1))
}

/// Counters for one bulk insert call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkStats {
    /// Rows inserted
    pub rows: usize,

    /// Statement executions
    pub batches: usize,

    /// Statements compiled (at most 3)
    pub statements_compiled: usize,
}

/// Compiled statements keyed by batch size, owned by one bulk insert call
struct StatementCache<'a> {
    conn: &'a Connection,
    template: &'a str,
    columns: usize,
    slots: [Option<Statement<'a>>; 3],
    compiled: usize,
}

impl<'a> StatementCache<'a> {
    fn new(conn: &'a Connection, template: &'a str, columns: usize) -> Self {
        Self {
            conn,
            template,
            columns,
            slots: [None, None, None],
            compiled: 0,
        }
    }

    /// Statement for `size`, compiled on first use
    fn statement(&mut self, size: BatchSize) -> DbResult<&mut Statement<'a>> {
        let stmt = match self.slots[size.slot()].take() {
            Some(stmt) => stmt,
            None => {
                let sql = render_sql(self.template, self.columns, size.rows())?;
                let stmt = self.conn.prepare(&sql).map_err(DbError::prepare(&sql))?;
                self.compiled += 1;
                debug!(batch = size.rows(), "Compiled bulk insert statement");
                stmt
            }
        };
        Ok(self.slots[size.slot()].insert(stmt))
    }

    fn compiled(&self) -> usize {
        self.compiled
    }

    /// Release every compiled statement, smallest size first
    fn finalize(self) -> DbResult<()> {
        for stmt in self.slots.into_iter().flatten() {
            stmt.finalize().map_err(DbError::Finalize)?;
        }
        Ok(())
    }
}

/// Fail if `conn` is back in autocommit mode, i.e. its transaction has ended
fn ensure_in_transaction(conn: &Connection) -> DbResult<()> {
    if conn.is_autocommit() {
        return Err(DbError::Transaction {
            op: "finalize",
            reason: "releasing statements ended the enclosing transaction".into(),
        });
    }
    Ok(())
}

/// Insert `rows` using the batched strategy inside one transaction
///
/// On any error the statements are dropped and the transaction rolls back
/// before this returns.
pub fn bulk_insert<T: BindRow>(
    conn: &mut Connection,
    template: &str,
    rows: &[T],
) -> DbResult<BulkStats> {
    // Reject a bad template before touching the database
    render_sql(template, T::COLUMNS, 1)?;

    let tx = conn.transaction().map_err(DbError::transaction("begin"))?;
    let mut stats = BulkStats {
        rows: rows.len(),
        ..BulkStats::default()
    };

    {
        let mut cache = StatementCache::new(&tx, template, T::COLUMNS);
        let mut args: Vec<ToSqlOutput<'_>> =
            Vec::with_capacity(T::COLUMNS * BatchSize::Hundred.rows());
        let mut rest = rows;

        for size in plan_batches(rows.len()) {
            let (batch, tail) = rest.split_at(size.rows());
            rest = tail;

            args.clear();
            for row in batch {
                row.bind(&mut args);
            }

            let stmt = cache.statement(size)?;
            stmt.execute(params_from_iter(args.iter()))
                .map_err(|source| DbError::Exec {
                    sql: format!("{} [{} rows]", template, size.rows()),
                    source,
                })?;
            stats.batches += 1;
        }

        stats.statements_compiled = cache.compiled();
        cache.finalize()?;
    }

    ensure_in_transaction(&tx)?;
    tx.commit().map_err(DbError::transaction("commit"))?;

    debug!(
        rows = stats.rows,
        batches = stats.batches,
        compiled = stats.statements_compiled,
        "Bulk insert committed"
    );

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::{self, Journal, INSERT_USERS_BULK_SQL, INSERT_USER_SQL, SELECT_USERS_SQL};
    use crate::db::sqlite::SqliteDb;
    use crate::db::Db;
    use crate::model::padded_users;

    fn fresh_db() -> SqliteDb {
        let mut db = SqliteDb::open_in_memory().unwrap();
        schema::init(&mut db, Journal::Delete).unwrap();
        db
    }

    #[test]
    fn test_plan_sums_to_n() {
        for n in (0..=1_250).chain([9_999, 10_000, 123_457]) {
            let plan: Vec<_> = plan_batches(n).collect();
            let total: usize = plan.iter().map(|b| b.rows()).sum();
            assert_eq!(total, n, "n = {}", n);

            // Sizes never grow again once they shrink
            assert!(plan.windows(2).all(|w| w[0] >= w[1]), "n = {}", n);

            let count = |size| plan.iter().filter(|&&b| b == size).count();
            assert_eq!(count(BatchSize::Hundred), n / 100);
            assert_eq!(count(BatchSize::Ten), (n % 100) / 10);
            assert_eq!(count(BatchSize::One), n % 10);
        }
    }

    #[test]
    fn test_plan_edges() {
        assert_eq!(plan_batches(0).count(), 0);
        assert_eq!(plan_batches(1).collect::<Vec<_>>(), vec![BatchSize::One]);
        assert_eq!(
            plan_batches(119).collect::<Vec<_>>(),
            [vec![BatchSize::Hundred, BatchSize::Ten], vec![BatchSize::One; 9]].concat()
        );
    }

    #[test]
    fn test_render_sql() {
        let sql = render_sql("INSERT INTO t(a,b) VALUES %s", 2, 3).unwrap();
        assert_eq!(sql, "INSERT INTO t(a,b) VALUES (?,?),(?,?),(?,?)");

        let err = render_sql("INSERT INTO t(a,b) VALUES (?,?)", 2, 3).unwrap_err();
        assert!(matches!(err, DbError::InvalidTemplate { .. }));
    }

    #[test]
    fn test_bulk_matches_row_by_row() {
        let users = padded_users(1_234);

        let mut bulk = fresh_db();
        let stats = bulk_insert(bulk.connection_mut(), INSERT_USERS_BULK_SQL, &users).unwrap();
        assert_eq!(stats.rows, 1_234);
        assert_eq!(stats.batches, 12 + 3 + 4);
        assert_eq!(stats.statements_compiled, 3);

        let mut single = fresh_db();
        single.insert_users(INSERT_USER_SQL, &users).unwrap();

        let from_bulk = bulk.find_users(SELECT_USERS_SQL).unwrap();
        let from_single = single.find_users(SELECT_USERS_SQL).unwrap();
        assert_eq!(from_bulk, from_single);
        assert_eq!(from_bulk, users);
    }

    #[test]
    fn test_bulk_compiles_only_sizes_used() {
        let mut db = fresh_db();
        let stats = bulk_insert(db.connection_mut(), INSERT_USERS_BULK_SQL, &padded_users(300)).unwrap();
        assert_eq!(stats.batches, 3);
        assert_eq!(stats.statements_compiled, 1);

        let mut db = fresh_db();
        let stats = bulk_insert(db.connection_mut(), INSERT_USERS_BULK_SQL, &padded_users(1)).unwrap();
        assert_eq!(stats.batches, 1);
        assert_eq!(stats.statements_compiled, 1);
    }

    #[test]
    fn test_bulk_zero_rows_commits_empty_transaction() {
        let mut db = fresh_db();
        let stats = bulk_insert(db.connection_mut(), INSERT_USERS_BULK_SQL, &padded_users(0)).unwrap();
        assert_eq!(stats, BulkStats::default());

        assert!(db.connection().is_autocommit());
        assert!(db.find_users(SELECT_USERS_SQL).unwrap().is_empty());
    }

    #[test]
    fn test_bulk_failure_rolls_back() {
        let mut db = fresh_db();
        let mut users = padded_users(150);
        // Duplicate primary key in the second (size 10) batch
        users[105].id = 1;

        let err = bulk_insert(db.connection_mut(), INSERT_USERS_BULK_SQL, &users).unwrap_err();
        assert!(matches!(err, DbError::Exec { .. }));

        assert!(db.connection().is_autocommit());
        assert!(db.find_users(SELECT_USERS_SQL).unwrap().is_empty());
    }

    #[test]
    fn test_finalize_keeps_transaction_open() {
        let mut db = fresh_db();
        let tx = db.connection_mut().transaction().unwrap();

        let mut cache = StatementCache::new(&tx, INSERT_USERS_BULK_SQL, 4);
        for size in [BatchSize::One, BatchSize::Ten, BatchSize::Hundred] {
            cache.statement(size).unwrap();
        }
        assert_eq!(cache.compiled(), 3);
        cache.finalize().unwrap();

        assert!(!tx.is_autocommit());
        ensure_in_transaction(&tx).unwrap();
        tx.commit().unwrap();
    }

    #[test]
    fn test_ended_transaction_detected() {
        let db = fresh_db();
        assert!(db.connection().is_autocommit());

        let err = ensure_in_transaction(db.connection()).unwrap_err();
        assert!(matches!(err, DbError::Transaction { op: "finalize", .. }));
        assert_eq!(err.kind(), crate::error::ErrorKind::Transaction);
    }

    #[test]
    fn test_bulk_rejects_template_without_placeholder() {
        let mut db = fresh_db();
        let err = bulk_insert(db.connection_mut(), INSERT_USER_SQL, &padded_users(5)).unwrap_err();
        assert!(matches!(err, DbError::InvalidTemplate { .. }));
    }
}

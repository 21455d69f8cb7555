//! Concurrent readers over a populated file
//!
//! One connection inserts every row and closes. Then `readers` threads each
//! open their own connection and read and validate the full table at the
//! same time. The query time covers all readers, start to join.

use crate::bench::pool::{run_workers, WorkerEvent, WorkerTotals};
use crate::bench::validate::{expect_count, expect_rows};
use crate::bench::{elapsed_ms, fresh_db, BenchContext, ScenarioReport};
use crate::db::schema::{INSERT_USER_SQL, READER_PRAGMAS, SELECT_USERS_SQL};
use crate::db::{db_size, Journal};
use crate::error::Result;
use crate::model::plain_users;
use std::time::Instant;

pub fn concurrent(
    ctx: &BenchContext<'_>,
    name: String,
    users: usize,
    readers: usize,
) -> Result<ScenarioReport> {
    let mut db = fresh_db(ctx, Journal::Delete)?;
    let rows = plain_users(users);

    let started = Instant::now();
    db.insert_users(INSERT_USER_SQL, &rows)?;
    let insert = elapsed_ms(started);

    let driver = db.driver_name().to_string();
    db.close()?;

    let factory = ctx.factory;
    let dbfile = ctx.dbfile;
    let rows = rows.as_slice();
    let mut totals = WorkerTotals::default();

    let started = Instant::now();
    run_workers(
        "reader",
        readers,
        |id, events| {
            let mut db = factory.open(dbfile)?;
            db.exec(READER_PRAGMAS)?;
            let found = db.find_users(SELECT_USERS_SQL)?;
            expect_rows(rows, &found)?;
            db.close()?;

            // Receiver outlives every worker
            let _ = events.send(WorkerEvent::Read {
                worker: id,
                rows: found.len(),
            });
            Ok(())
        },
        |event| {
            totals.record(&event);
            ctx.status
                .set_status(&format!("{}: {} rows read", name, totals.rows_read));
        },
    )?;
    let query = elapsed_ms(started);
    expect_count("users read", users * readers, totals.rows_read)?;

    Ok(ScenarioReport::new(name, driver)
        .with("insert", insert)
        .with("query", query)
        .with("dbsize", db_size(ctx.dbfile)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Driver;
    use tempfile::tempdir;

    #[test]
    fn test_readers_validate_full_table() {
        let dir = tempdir().unwrap();
        let dbfile = dir.path().join("concurrent.db");

        for driver in [Driver::Rusqlite, Driver::RusqliteCached] {
            let ctx = BenchContext {
                dbfile: &dbfile,
                factory: &driver,
                status: &(),
            };
            let report = concurrent(&ctx, "5_concurrent/4".into(), 2_000, 4).unwrap();
            assert_eq!(report.driver, driver.name());
            assert!(report.metric("dbsize").unwrap() > 0);
        }
    }

    #[test]
    fn test_zero_readers_rejected() {
        let dir = tempdir().unwrap();
        let dbfile = dir.path().join("concurrent.db");
        let ctx = BenchContext {
            dbfile: &dbfile,
            factory: &Driver::Rusqlite,
            status: &(),
        };
        assert!(concurrent(&ctx, "5_concurrent/0".into(), 10, 0).is_err());
    }
}

//! Single-table user scenarios: simple, bulk, many and large
//!
//! All four insert into `users` with the DELETE journal, read the table back
//! ordered by id and compare it row by row with what was generated.

use crate::bench::validate::{expect_count, expect_rows};
use crate::bench::{close_and_measure, elapsed_ms, fresh_db, BenchContext, ScenarioReport};
use crate::db::schema::{INSERT_USERS_BULK_SQL, INSERT_USER_SQL, SELECT_USERS_SQL};
use crate::db::{require_bulk, Journal};
use crate::error::Result;
use crate::model::{large_users, padded_users, User};
use std::time::Instant;
use tracing::debug;

/// Row-by-row insert of `users` rows, then one full read
pub fn simple(ctx: &BenchContext<'_>, name: String, users: usize) -> Result<ScenarioReport> {
    let mut db = fresh_db(ctx, Journal::Delete)?;
    let rows = padded_users(users);

    let started = Instant::now();
    db.insert_users(INSERT_USER_SQL, &rows)?;
    let insert = elapsed_ms(started);

    let started = Instant::now();
    let found = db.find_users(SELECT_USERS_SQL)?;
    let query = elapsed_ms(started);
    expect_rows(&rows, &found)?;

    let report = ScenarioReport::new(name, db.driver_name())
        .with("insert", insert)
        .with("query", query);
    close_and_measure(ctx, db, report)
}

/// Same workload as [`simple`], inserted with the batched bulk strategy
///
/// Fails before generating any rows when the driver has no bulk capability.
pub fn bulk(ctx: &BenchContext<'_>, name: String, users: usize) -> Result<ScenarioReport> {
    let mut db = fresh_db(ctx, Journal::Delete)?;
    require_bulk(db.as_mut())?;
    let rows = padded_users(users);

    let started = Instant::now();
    let stats = require_bulk(db.as_mut())?.insert_users_bulk(INSERT_USERS_BULK_SQL, &rows)?;
    let insert = elapsed_ms(started);
    debug!(
        batches = stats.batches,
        compiled = stats.statements_compiled,
        "Bulk insert finished"
    );

    let started = Instant::now();
    let found = db.find_users(SELECT_USERS_SQL)?;
    let query = elapsed_ms(started);
    expect_rows(&rows, &found)?;

    let report = ScenarioReport::new(name, db.driver_name())
        .with("insert", insert)
        .with("query", query);
    close_and_measure(ctx, db, report)
}

/// A small table read `queries` times in a row
pub fn many(
    ctx: &BenchContext<'_>,
    name: String,
    users: usize,
    queries: usize,
) -> Result<ScenarioReport> {
    let mut db = fresh_db(ctx, Journal::Delete)?;
    let rows = padded_users(users);

    let started = Instant::now();
    db.insert_users(INSERT_USER_SQL, &rows)?;
    let insert = elapsed_ms(started);

    let started = Instant::now();
    let mut last: Option<Vec<User>> = None;
    for _ in 0..queries {
        let found = db.find_users(SELECT_USERS_SQL)?;
        expect_count("users", users, found.len())?;
        last = Some(found);
    }
    let query = elapsed_ms(started);

    if let Some(found) = last {
        expect_rows(&rows, &found)?;
    }

    let report = ScenarioReport::new(name, db.driver_name())
        .with("insert", insert)
        .with("query", query);
    close_and_measure(ctx, db, report)
}

/// Users whose email column holds `row_size` bytes
pub fn large(
    ctx: &BenchContext<'_>,
    name: String,
    users: usize,
    row_size: usize,
) -> Result<ScenarioReport> {
    let mut db = fresh_db(ctx, Journal::Delete)?;
    let rows = large_users(users, row_size);

    let started = Instant::now();
    db.insert_users(INSERT_USER_SQL, &rows)?;
    let insert = elapsed_ms(started);

    let started = Instant::now();
    let found = db.find_users(SELECT_USERS_SQL)?;
    let query = elapsed_ms(started);
    expect_rows(&rows, &found)?;

    let report = ScenarioReport::new(name, db.driver_name())
        .with("insert", insert)
        .with("query", query);
    close_and_measure(ctx, db, report)
}

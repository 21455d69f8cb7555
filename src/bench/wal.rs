//! Concurrent writers and readers on one WAL-mode file
//!
//! # Worker protocol
//!
//! ```text
//!  rows ──split_even(workers)──▶ shard 0 │ shard 1 │ ... │ shard N-1
//!                                   │
//!                     split_even(chunks)
//!                                   ▼
//!   for chunk i:  insert(i) ──▶ verify(i) ──▶ verify(i-1) ──▶ verify(i-2)
//! ```
//!
//! Every worker owns its connection and applies the WAL PRAGMAs itself.
//! Writers serialize on SQLite's own lock (bounded by `busy_timeout`); the
//! harness adds no locking of its own. A verification reads its chunk with
//! an id-range query and compares it exactly with the generated rows.

use crate::bench::partition::{split_even, verify_window};
use crate::bench::pool::{run_workers, WorkerEvent, WorkerTotals};
use crate::bench::validate::{expect_count, expect_rows};
use crate::bench::{elapsed_ms, fresh_db, BenchContext, ScenarioReport};
use crate::db::schema::{select_users_between, INSERT_USER_SQL, JOURNAL_WAL_PRAGMAS};
use crate::db::{db_size, Db, DbFactory, Journal};
use crate::error::{ConfigError, Result};
use crate::model::{plain_users, User};
use crossbeam_channel::Sender;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

pub fn wal(
    ctx: &BenchContext<'_>,
    name: String,
    users: usize,
    workers: usize,
    chunks: usize,
) -> Result<ScenarioReport> {
    if chunks == 0 {
        return Err(ConfigError::InvalidChunkCount { count: chunks }.into());
    }

    let db = fresh_db(ctx, Journal::Wal)?;
    let driver = db.driver_name().to_string();
    db.close()?;

    let rows = plain_users(users);
    let shards = split_even(&rows, workers);
    let factory = ctx.factory;
    let dbfile = ctx.dbfile;
    let mut totals = WorkerTotals::default();

    let started = Instant::now();
    run_workers(
        "wal",
        workers,
        |id, events| {
            WalWorker {
                id,
                shard: shards[id],
                chunks,
                factory,
                dbfile,
                events,
            }
            .run()
        },
        |event| {
            totals.record(&event);
            if let WorkerEvent::Inserted { .. } = event {
                ctx.status.set_status(&format!(
                    "{}: {}/{} rows inserted",
                    name, totals.rows_inserted, users
                ));
            }
        },
    )?;
    let elapsed = elapsed_ms(started);

    expect_count("users inserted", users, totals.rows_inserted)?;
    expect_count(
        "chunks verified",
        workers * verifications_per_shard(chunks),
        totals.chunks_verified,
    )?;

    Ok(ScenarioReport::new(name, driver)
        .with("insert_query", elapsed)
        .with("dbsize", db_size(ctx.dbfile)?))
}

/// Chunk reads one worker performs over a shard of `chunks` chunks
pub fn verifications_per_shard(chunks: usize) -> usize {
    (0..chunks).map(|i| verify_window(i).count()).sum()
}

/// One writer/reader thread's state
struct WalWorker<'a> {
    id: usize,
    shard: &'a [User],
    chunks: usize,
    factory: &'a dyn DbFactory,
    dbfile: &'a Path,
    events: &'a Sender<WorkerEvent>,
}

impl WalWorker<'_> {
    fn run(self) -> Result<()> {
        let mut db = self.factory.open(self.dbfile)?;
        db.exec(JOURNAL_WAL_PRAGMAS)?;

        let chunks = split_even(self.shard, self.chunks);
        debug!(
            worker = self.id,
            rows = self.shard.len(),
            chunks = chunks.len(),
            "WAL worker starting"
        );

        for (i, chunk) in chunks.iter().enumerate() {
            db.insert_users(INSERT_USER_SQL, chunk)?;
            self.send(WorkerEvent::Inserted {
                worker: self.id,
                chunk: i,
                rows: chunk.len(),
            });

            for back in verify_window(i) {
                verify_chunk(db.as_ref(), chunks[back])?;
                self.send(WorkerEvent::Verified {
                    worker: self.id,
                    chunk: back,
                    rows: chunks[back].len(),
                });
            }
        }

        db.close()?;
        Ok(())
    }

    fn send(&self, event: WorkerEvent) {
        // The receiver is only dropped after every worker has returned
        let _ = self.events.send(event);
    }
}

/// Read back one chunk by id range and compare it with what was inserted
fn verify_chunk(db: &dyn Db, chunk: &[User]) -> Result<()> {
    let (Some(first), Some(last)) = (chunk.first(), chunk.last()) else {
        return Ok(());
    };
    let found = db.find_users(&select_users_between(first.id, last.id))?;
    expect_rows(chunk, &found)?;
    Ok(())
}

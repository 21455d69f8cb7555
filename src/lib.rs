//! sqlite-bench - Cross-driver SQLite benchmark harness
//!
//! Runs identical workloads against a SQLite file through interchangeable
//! drivers and reports elapsed time and on-disk size for each.
//!
//! # Features
//!
//! - **Batched Bulk Insert**: Rows go in as 100-, 10- and 1-row multi-value
//!   inserts inside one transaction, compiling at most three statements.
//!
//! - **WAL Concurrency**: N writer threads, each with its own connection,
//!   insert disjoint shards and re-read their latest chunks while the others
//!   keep writing.
//!
//! - **Join Flattening**: A three-table LEFT JOIN is rebuilt into
//!   deduplicated users, articles and comments.
//!
//! - **Validated Results**: Every read is compared with the generated rows
//!   before a timing is reported.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 CLI (config) → Plan of Scenarios                 │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          Harness                                 │
//! │  ┌────────┐ ┌───────┐ ┌─────────┐ ┌──────┐ ┌───────┐ ┌────────┐ │
//! │  │simple  │ │bulk   │ │complex  │ │many  │ │large  │ │conc/wal│ │
//! │  └───┬────┘ └───┬───┘ └────┬────┘ └──┬───┘ └───┬───┘ └───┬────┘ │
//! │      └──────────┴──────────┼─────────┴─────────┘         │      │
//! │                            │                  worker threads    │
//! │                            ▼                  (own connection)  │
//! │            ┌──────────────────────────┐                         │
//! │            │   Db / BulkDb (driver)   │◀────────────────────────┘
//! │            └──────────────────────────┘                         │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │
//!                               ▼
//!                    ┌──────────────────┐
//!                    │   SQLite file    │
//!                    │   (+ -wal/-shm)  │
//!                    └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```bash
//! # Insert/read 1M users, row by row and bulk
//! sqlite-bench bench.db --simple --bulk
//!
//! # Everything, with debug logging on stderr
//! sqlite-bench /tmp/bench.db --all -v
//! ```

pub mod bench;
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod report;

pub use bench::{BenchContext, Harness, Plan, Scenario, ScenarioReport, Selection, Sizes};
pub use config::{BenchConfig, CliArgs};
pub use error::{BenchError, ErrorKind, Result};

//! Benchmark scenarios and the harness that runs them
//!
//! A [`Selection`] of scenario flags becomes a [`Plan`]: an ordered list of
//! parameterized [`Scenario`]s. The [`Harness`] runs the plan front to back
//! against one database file, handing each [`ScenarioReport`] to the caller
//! as soon as it completes. The first error stops the run; reports already
//! handed out stay valid.
//!
//! # Scenario flow
//!
//! ```text
//! ┌──────────┐   ┌────────────┐   ┌──────────┐   ┌──────────┐   ┌─────────┐
//! │ remove   │──▶│ open, DDL, │──▶│ generate │──▶│ insert   │──▶│ query + │
//! │ db files │   │ PRAGMAs    │   │ rows     │   │ (timed)  │   │ validate│
//! └──────────┘   └────────────┘   └──────────┘   └──────────┘   └────┬────┘
//!                                                                    │
//!                                        close, measure file size ◀──┘
//! ```

pub mod complex;
pub mod concurrent;
pub mod partition;
pub mod pool;
pub mod users;
pub mod validate;
pub mod wal;

pub use partition::{split_even, CHUNKS_PER_SHARD};
pub use pool::{run_workers, WorkerEvent, WorkerTotals};

use crate::db::{remove_db_files, schema, Db, DbFactory, Journal};
use crate::error::Result;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Which scenario families to run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub simple: bool,
    pub complex: bool,
    pub many: bool,
    pub large: bool,
    pub concurrent: bool,
    pub wal: bool,
    pub bulk: bool,
}

impl Selection {
    /// Every scenario family
    pub fn all() -> Self {
        Self {
            simple: true,
            complex: true,
            many: true,
            large: true,
            concurrent: true,
            wal: true,
            bulk: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Workload sizes used to build a plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sizes {
    pub simple_users: usize,
    pub bulk_users: usize,
    pub complex_users: usize,
    pub articles_per_user: usize,
    pub comments_per_article: usize,
    pub many_users: Vec<usize>,
    pub many_queries: usize,
    pub large_users: usize,
    pub large_row_sizes: Vec<usize>,
    pub concurrent_users: usize,
    pub readers: Vec<usize>,
    pub wal_users: usize,
    pub wal_workers: Vec<usize>,
    pub wal_chunks: usize,
}

impl Default for Sizes {
    fn default() -> Self {
        Self {
            simple_users: 1_000_000,
            bulk_users: 1_000_000,
            complex_users: 200,
            articles_per_user: 100,
            comments_per_article: 20,
            many_users: vec![10, 100, 1_000],
            many_queries: 1_000,
            large_users: 10_000,
            large_row_sizes: vec![50_000, 100_000, 200_000],
            concurrent_users: 1_000_000,
            readers: vec![2, 4, 8],
            wal_users: 1_000_000,
            wal_workers: vec![1, 2, 4, 8, 16],
            wal_chunks: CHUNKS_PER_SHARD,
        }
    }
}

/// One parameterized workload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scenario {
    Simple {
        users: usize,
    },
    Complex {
        users: usize,
        articles_per_user: usize,
        comments_per_article: usize,
    },
    Many {
        users: usize,
        queries: usize,
    },
    Large {
        users: usize,
        row_size: usize,
    },
    Concurrent {
        users: usize,
        readers: usize,
    },
    Wal {
        users: usize,
        workers: usize,
        chunks: usize,
    },
    Bulk {
        users: usize,
    },
}

impl Scenario {
    /// Name printed in the first column of every result line
    pub fn name(&self) -> String {
        match self {
            Scenario::Simple { .. } => "1_simple".to_string(),
            Scenario::Complex { .. } => "2_complex".to_string(),
            Scenario::Many { users, .. } => format!("3_many/{:04}", users),
            Scenario::Large { row_size, .. } => format!("4_large/{:06}", row_size),
            Scenario::Concurrent { readers, .. } => format!("5_concurrent/{}", readers),
            Scenario::Wal { workers, .. } => format!("6_wal/{:<2}", workers),
            Scenario::Bulk { .. } => "7_bulk".to_string(),
        }
    }

    pub fn run(&self, ctx: &BenchContext<'_>) -> Result<ScenarioReport> {
        let name = self.name();
        match *self {
            Scenario::Simple { users } => users::simple(ctx, name, users),
            Scenario::Complex {
                users,
                articles_per_user,
                comments_per_article,
            } => complex::complex(ctx, name, users, articles_per_user, comments_per_article),
            Scenario::Many { users, queries } => users::many(ctx, name, users, queries),
            Scenario::Large { users, row_size } => users::large(ctx, name, users, row_size),
            Scenario::Concurrent { users, readers } => {
                concurrent::concurrent(ctx, name, users, readers)
            }
            Scenario::Wal {
                users,
                workers,
                chunks,
            } => wal::wal(ctx, name, users, workers, chunks),
            Scenario::Bulk { users } => users::bulk(ctx, name, users),
        }
    }
}

/// Ordered scenarios to run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    scenarios: Vec<Scenario>,
}

impl Plan {
    /// Expand a selection with the given sizes
    ///
    /// Order: simple, bulk, complex, many, large, concurrent, wal.
    pub fn new(selection: &Selection, sizes: &Sizes) -> Self {
        let mut scenarios = Vec::new();

        if selection.simple {
            scenarios.push(Scenario::Simple {
                users: sizes.simple_users,
            });
        }
        if selection.bulk {
            scenarios.push(Scenario::Bulk {
                users: sizes.bulk_users,
            });
        }
        if selection.complex {
            scenarios.push(Scenario::Complex {
                users: sizes.complex_users,
                articles_per_user: sizes.articles_per_user,
                comments_per_article: sizes.comments_per_article,
            });
        }
        if selection.many {
            scenarios.extend(sizes.many_users.iter().map(|&users| Scenario::Many {
                users,
                queries: sizes.many_queries,
            }));
        }
        if selection.large {
            scenarios.extend(sizes.large_row_sizes.iter().map(|&row_size| Scenario::Large {
                users: sizes.large_users,
                row_size,
            }));
        }
        if selection.concurrent {
            scenarios.extend(sizes.readers.iter().map(|&readers| Scenario::Concurrent {
                users: sizes.concurrent_users,
                readers,
            }));
        }
        if selection.wal {
            scenarios.extend(sizes.wal_workers.iter().map(|&workers| Scenario::Wal {
                users: sizes.wal_users,
                workers,
                chunks: sizes.wal_chunks,
            }));
        }

        Self { scenarios }
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

/// Sink for short human-readable status updates
pub trait Status {
    fn set_status(&self, status: &str);
}

/// No status display
impl Status for () {
    fn set_status(&self, _status: &str) {}
}

/// What every scenario needs to run
pub struct BenchContext<'a> {
    /// Database file, removed and recreated by every scenario
    pub dbfile: &'a Path,

    /// Opens one handle per worker
    pub factory: &'a dyn DbFactory,

    pub status: &'a dyn Status,
}

/// A named measurement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metric {
    pub name: &'static str,
    pub value: u64,
}

/// Measurements of one scenario run; durations in milliseconds, sizes in bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioReport {
    pub scenario: String,
    pub driver: String,
    pub metrics: Vec<Metric>,
}

impl ScenarioReport {
    pub fn new(scenario: impl Into<String>, driver: impl Into<String>) -> Self {
        Self {
            scenario: scenario.into(),
            driver: driver.into(),
            metrics: Vec::new(),
        }
    }

    pub fn with(mut self, name: &'static str, value: u64) -> Self {
        self.metrics.push(Metric { name, value });
        self
    }

    /// Value of a metric by name
    pub fn metric(&self, name: &str) -> Option<u64> {
        self.metrics.iter().find(|m| m.name == name).map(|m| m.value)
    }
}

/// Runs a plan scenario by scenario
pub struct Harness<'a> {
    ctx: BenchContext<'a>,
}

impl<'a> Harness<'a> {
    pub fn new(ctx: BenchContext<'a>) -> Self {
        Self { ctx }
    }

    /// Run every scenario in order, calling `on_report` after each one
    pub fn run<F>(&self, plan: &Plan, mut on_report: F) -> Result<Vec<ScenarioReport>>
    where
        F: FnMut(&ScenarioReport),
    {
        let mut reports = Vec::with_capacity(plan.len());

        for scenario in plan.scenarios() {
            let name = scenario.name();
            info!(scenario = %name, "Starting scenario");
            self.ctx.status.set_status(&format!("Running {}", name));

            let started = Instant::now();
            let report = scenario.run(&self.ctx)?;
            info!(
                scenario = %name,
                elapsed_ms = elapsed_ms(started),
                "Scenario complete"
            );

            on_report(&report);
            reports.push(report);
        }

        Ok(reports)
    }
}

/// Remove any previous database files, open a fresh handle, create the schema
pub(crate) fn fresh_db(ctx: &BenchContext<'_>, journal: Journal) -> Result<Box<dyn Db>> {
    remove_db_files(ctx.dbfile)?;
    let mut db = ctx.factory.open(ctx.dbfile)?;
    schema::init(db.as_mut(), journal)?;
    Ok(db)
}

/// Close the handle and add the final on-disk size to the report
pub(crate) fn close_and_measure(
    ctx: &BenchContext<'_>,
    db: Box<dyn Db>,
    report: ScenarioReport,
) -> Result<ScenarioReport> {
    db.close()?;
    let size = crate::db::db_size(ctx.dbfile)?;
    Ok(report.with("dbsize", size))
}

pub(crate) fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_names() {
        assert_eq!(Scenario::Simple { users: 1 }.name(), "1_simple");
        assert_eq!(Scenario::Many { users: 10, queries: 1 }.name(), "3_many/0010");
        assert_eq!(
            Scenario::Large {
                users: 1,
                row_size: 50_000
            }
            .name(),
            "4_large/050000"
        );
        assert_eq!(Scenario::Concurrent { users: 1, readers: 8 }.name(), "5_concurrent/8");
        assert_eq!(
            Scenario::Wal {
                users: 1,
                workers: 4,
                chunks: 10
            }
            .name(),
            "6_wal/4 "
        );
        assert_eq!(
            Scenario::Wal {
                users: 1,
                workers: 16,
                chunks: 10
            }
            .name(),
            "6_wal/16"
        );
        assert_eq!(Scenario::Bulk { users: 1 }.name(), "7_bulk");
    }

    #[test]
    fn test_plan_order_and_defaults() {
        let plan = Plan::new(&Selection::all(), &Sizes::default());
        let names: Vec<String> = plan.scenarios().iter().map(Scenario::name).collect();
        assert_eq!(
            names,
            vec![
                "1_simple",
                "7_bulk",
                "2_complex",
                "3_many/0010",
                "3_many/0100",
                "3_many/1000",
                "4_large/050000",
                "4_large/100000",
                "4_large/200000",
                "5_concurrent/2",
                "5_concurrent/4",
                "5_concurrent/8",
                "6_wal/1 ",
                "6_wal/2 ",
                "6_wal/4 ",
                "6_wal/8 ",
                "6_wal/16",
            ]
        );
        assert_eq!(
            plan.scenarios()[2],
            Scenario::Complex {
                users: 200,
                articles_per_user: 100,
                comments_per_article: 20
            }
        );
    }

    #[test]
    fn test_plan_only_selected() {
        let selection = Selection {
            wal: true,
            ..Selection::default()
        };
        let plan = Plan::new(&selection, &Sizes::default());
        assert_eq!(plan.len(), 5);
        assert!(plan
            .scenarios()
            .iter()
            .all(|s| matches!(s, Scenario::Wal { users: 1_000_000, chunks: 10, .. })));

        assert!(Plan::new(&Selection::default(), &Sizes::default()).is_empty());
        assert!(Selection::default().is_empty());
        assert!(!Selection::all().is_empty());
    }

    #[test]
    fn test_report_metrics() {
        let report = ScenarioReport::new("1_simple", "rusqlite")
            .with("insert", 12)
            .with("query", 3);
        assert_eq!(report.metric("insert"), Some(12));
        assert_eq!(report.metric("query"), Some(3));
        assert_eq!(report.metric("dbsize"), None);
    }
}

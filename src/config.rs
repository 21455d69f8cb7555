//! Configuration types for sqlite-bench
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation

use crate::bench::{Plan, Selection, Sizes};
use crate::db::Driver;
use crate::error::ConfigError;
use clap::Parser;
use std::path::PathBuf;

/// Cross-driver SQLite benchmark harness
#[derive(Parser, Debug, Clone)]
#[command(
    name = "sqlite-bench",
    version,
    about = "Cross-driver SQLite benchmark harness",
    long_about = "Runs identical insert/query workloads against a SQLite file through \
                  interchangeable drivers and reports timings (ms) and file size (bytes).\n\n\
                  The database file and its -journal/-wal/-shm companions are deleted \
                  before every scenario.",
    after_help = "EXAMPLES:\n    \
        sqlite-bench bench.db --simple --bulk\n    \
        sqlite-bench /tmp/bench.db --wal -v\n    \
        sqlite-bench bench.db --all --driver rusqlite_cached"
)]
pub struct CliArgs {
    /// Database file to benchmark against (recreated for every scenario)
    #[arg(value_name = "DBFILE")]
    pub dbfile: Option<PathBuf>,

    /// Insert then read 1M users row by row
    #[arg(long)]
    pub simple: bool,

    /// Users, articles and comments read through one join
    #[arg(long)]
    pub complex: bool,

    /// Many repeated reads of a small table
    #[arg(long)]
    pub many: bool,

    /// Rows with very large text columns
    #[arg(long)]
    pub large: bool,

    /// Parallel readers over a populated file
    #[arg(long)]
    pub concurrent: bool,

    /// Parallel writers and readers in WAL mode
    #[arg(long)]
    pub wal: bool,

    /// 1M users with the batched bulk insert
    #[arg(long)]
    pub bulk: bool,

    /// Run every scenario
    #[arg(long)]
    pub all: bool,

    /// Database driver
    #[arg(long, value_enum, default_value_t = Driver::default())]
    pub driver: Driver,

    /// Quiet mode - suppress header, spinner and summary
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Database file
    pub dbfile: PathBuf,

    /// Selected scenario families
    pub selection: Selection,

    /// Workload sizes
    pub sizes: Sizes,

    pub driver: Driver,

    /// Show header, spinner and summary
    pub show_progress: bool,
}

impl BenchConfig {
    /// Create config from CLI arguments with validation
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        let dbfile = match args.dbfile {
            Some(path) if !path.as_os_str().is_empty() => path,
            _ => return Err(ConfigError::MissingDbFile),
        };

        if let Some(parent) = dbfile.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                return Err(ConfigError::InvalidDbPath {
                    path: dbfile.clone(),
                    reason: format!("directory '{}' does not exist", parent.display()),
                });
            }
        }
        if dbfile.is_dir() {
            return Err(ConfigError::InvalidDbPath {
                path: dbfile,
                reason: "is a directory".to_string(),
            });
        }

        let selection = if args.all {
            Selection::all()
        } else {
            Selection {
                simple: args.simple,
                complex: args.complex,
                many: args.many,
                large: args.large,
                concurrent: args.concurrent,
                wal: args.wal,
                bulk: args.bulk,
            }
        };
        if selection.is_empty() {
            return Err(ConfigError::NothingSelected);
        }

        Ok(Self {
            dbfile,
            selection,
            sizes: Sizes::default(),
            driver: args.driver,
            show_progress: !args.quiet,
        })
    }

    /// Ordered scenarios for this configuration
    pub fn plan(&self) -> Plan {
        Plan::new(&self.selection, &self.sizes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn parse(args: &[&str]) -> Result<BenchConfig, ConfigError> {
        let args = CliArgs::try_parse_from(std::iter::once("sqlite-bench").chain(args.iter().copied()))
            .unwrap();
        BenchConfig::from_args(args)
    }

    #[test]
    fn test_flags_to_selection() {
        let config = parse(&["bench.db", "--simple", "--wal"]).unwrap();
        assert_eq!(config.dbfile, PathBuf::from("bench.db"));
        assert_eq!(
            config.selection,
            Selection {
                simple: true,
                wal: true,
                ..Selection::default()
            }
        );
        assert_eq!(config.driver, Driver::Rusqlite);
        assert!(config.show_progress);
        assert_eq!(config.plan().len(), 1 + 5);
    }

    #[test]
    fn test_all_flag() {
        let config = parse(&["bench.db", "--all", "-q", "--driver", "rusqlite_cached"]).unwrap();
        assert_eq!(config.selection, Selection::all());
        assert_eq!(config.driver, Driver::RusqliteCached);
        assert!(!config.show_progress);
        assert_eq!(config.plan().len(), 17);
    }

    #[test]
    fn test_missing_dbfile() {
        assert!(matches!(parse(&["--simple"]), Err(ConfigError::MissingDbFile)));

        let mut args = CliArgs::try_parse_from(["sqlite-bench", "--simple"]).unwrap();
        args.dbfile = Some(PathBuf::new());
        assert!(matches!(BenchConfig::from_args(args), Err(ConfigError::MissingDbFile)));
    }

    #[test]
    fn test_nothing_selected() {
        assert!(matches!(parse(&["bench.db"]), Err(ConfigError::NothingSelected)));
    }

    #[test]
    fn test_invalid_db_path() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope").join("bench.db");
        let err = parse(&[missing.to_str().unwrap(), "--simple"]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDbPath { .. }));

        let err = parse(&[dir.path().to_str().unwrap(), "--simple"]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDbPath { .. }));
    }

    #[test]
    fn test_unknown_driver_rejected_by_parser() {
        let result = CliArgs::try_parse_from(["sqlite-bench", "bench.db", "--driver", "postgres"]);
        assert!(result.is_err());
    }
}

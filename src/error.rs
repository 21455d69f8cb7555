//! Error types for sqlite-bench
//!
//! This module defines the error hierarchy for the harness:
//! - Database errors, tagged by the operation that failed
//! - Data-integrity validation errors
//! - Configuration and CLI errors
//! - Worker thread errors
//!
//! Nothing here is recoverable. A benchmark run stops at the first error,
//! and whatever was already reported for earlier scenarios stays valid.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a failure, used for reporting and in tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Connection,
    Prepare,
    Exec,
    Scan,
    Transaction,
    Validation,
    Argument,
    Worker,
    Io,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Connection => "connection",
            ErrorKind::Prepare => "prepare",
            ErrorKind::Exec => "exec",
            ErrorKind::Scan => "scan",
            ErrorKind::Transaction => "transaction",
            ErrorKind::Validation => "validation",
            ErrorKind::Argument => "argument",
            ErrorKind::Worker => "worker",
            ErrorKind::Io => "io",
        };
        f.write_str(name)
    }
}

/// Top-level error type for the harness
#[derive(Error, Debug)]
pub enum BenchError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// Result set did not match what was inserted
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Worker/concurrency errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    /// I/O errors (removing or sizing database files)
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl BenchError {
    /// Which operation class failed
    pub fn kind(&self) -> ErrorKind {
        match self {
            BenchError::Database(e) => e.kind(),
            BenchError::Validation(_) => ErrorKind::Validation,
            BenchError::Config(_) => ErrorKind::Argument,
            BenchError::Worker(e) => e.kind(),
            BenchError::Io { .. } => ErrorKind::Io,
        }
    }
}

/// Database errors, one variant per operation
#[derive(Error, Debug)]
pub enum DbError {
    /// Failed to open a connection
    #[error("Failed to open database '{path}': {source}")]
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },

    /// Failed to compile a statement
    #[error("Failed to prepare '{sql}': {source}")]
    Prepare {
        sql: String,
        source: rusqlite::Error,
    },

    /// Failed to execute a statement
    #[error("Failed to execute '{sql}': {source}")]
    Exec {
        sql: String,
        source: rusqlite::Error,
    },

    /// Failed to read or decode a result row
    #[error("Failed to scan row: {0}")]
    Scan(#[source] rusqlite::Error),

    /// Stored timestamp does not map back to an instant
    #[error("Timestamp {value} out of range in column '{column}'")]
    TimestampOutOfRange { column: &'static str, value: i64 },

    /// Begin/commit failed, or the transaction ended early
    #[error("Transaction {op} failed: {reason}")]
    Transaction { op: &'static str, reason: String },

    /// Failed to finalize a statement
    #[error("Failed to finalize statement: {0}")]
    Finalize(#[source] rusqlite::Error),

    /// Failed to close the connection
    #[error("Failed to close connection: {0}")]
    Close(#[source] rusqlite::Error),

    /// Bulk insert requested from a driver without the capability
    #[error("Driver '{driver}' does not support bulk insert")]
    BulkUnsupported { driver: String },

    /// Bulk template is missing its value-tuple placeholder
    #[error("Bulk insert template has no '%s' placeholder: {template}")]
    InvalidTemplate { template: String },
}

impl DbError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::Open { .. } | DbError::Close(_) => ErrorKind::Connection,
            DbError::Prepare { .. } | DbError::InvalidTemplate { .. } => ErrorKind::Prepare,
            DbError::Exec { .. } | DbError::BulkUnsupported { .. } => ErrorKind::Exec,
            DbError::Scan(_) | DbError::TimestampOutOfRange { .. } => ErrorKind::Scan,
            DbError::Transaction { .. } | DbError::Finalize(_) => ErrorKind::Transaction,
        }
    }

    pub(crate) fn prepare(sql: &str) -> impl FnOnce(rusqlite::Error) -> DbError + '_ {
        move |source| DbError::Prepare {
            sql: sql.to_string(),
            source,
        }
    }

    pub(crate) fn exec(sql: &str) -> impl FnOnce(rusqlite::Error) -> DbError + '_ {
        move |source| DbError::Exec {
            sql: sql.to_string(),
            source,
        }
    }

    pub(crate) fn transaction(op: &'static str) -> impl FnOnce(rusqlite::Error) -> DbError {
        move |e| DbError::Transaction {
            op,
            reason: e.to_string(),
        }
    }
}

/// Mismatch between what a scenario inserted and what it read back
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Wrong number of rows
    #[error("{what}: expected {expected} rows, got {actual}")]
    CountMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Row at a position carries the wrong identifier
    #[error("{what}[{index}]: expected id {expected}, got {actual}")]
    IdMismatch {
        what: &'static str,
        index: usize,
        expected: i64,
        actual: i64,
    },

    /// A payload field differs from the generation rule
    #[error("{what} id {id}: field '{field}' expected {expected}, got {actual}")]
    FieldMismatch {
        what: &'static str,
        id: i64,
        field: &'static str,
        expected: String,
        actual: String,
    },

    /// A foreign key fell outside the generated parent range
    #[error("{what} id {id}: {field} {value} outside [{min}, {max}]")]
    OutOfRange {
        what: &'static str,
        id: i64,
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// A column that must be non-decreasing went backwards
    #[error("{what} id {id}: {field} {value} after {previous}")]
    OutOfOrder {
        what: &'static str,
        id: i64,
        field: &'static str,
        value: i64,
        previous: i64,
    },
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Positional database path missing or empty
    #[error("dbfile empty, cannot bench")]
    MissingDbFile,

    /// Database path points into a directory that does not exist
    #[error("Invalid database path '{path}': {reason}")]
    InvalidDbPath { path: PathBuf, reason: String },

    /// No scenario flag given
    #[error("No benchmark selected (use --simple, --complex, --many, --large, --concurrent, --wal, --bulk or --all)")]
    NothingSelected,

    /// Invalid worker/reader count
    #[error("Invalid worker count {count}: must be at least 1")]
    InvalidWorkerCount { count: usize },

    /// Invalid number of chunks per WAL shard
    #[error("Invalid chunk count {count}: must be at least 1")]
    InvalidChunkCount { count: usize },
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker panicked
    #[error("Worker {id} panicked: {message}")]
    Panicked { id: usize, message: String },

    /// Failed to spawn the worker thread
    #[error("Failed to spawn worker {id}: {reason}")]
    SpawnFailed { id: usize, reason: String },

    /// Worker failed with a database or validation error
    #[error("Worker {id} failed: {source}")]
    Failed {
        id: usize,
        #[source]
        source: Box<BenchError>,
    },
}

impl WorkerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkerError::Failed { source, .. } => source.kind(),
            WorkerError::Panicked { .. } | WorkerError::SpawnFailed { .. } => ErrorKind::Worker,
        }
    }
}

/// Result type alias for BenchError
pub type Result<T> = std::result::Result<T, BenchError>;

/// Result type alias for DbError
pub type DbResult<T> = std::result::Result<T, DbError>;

/// Result type alias for ValidationError
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

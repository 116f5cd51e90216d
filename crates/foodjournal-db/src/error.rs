//! Store error taxonomy: setup, read and write failures.

use std::path::PathBuf;

use rusqlite::ErrorCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Opening the database file or creating the schema failed.
    /// The store stays uninitialized; a later call retries from scratch.
    #[error("failed to initialize store at '{path}': {source}")]
    Init {
        path: PathBuf,
        #[source]
        source: Failure,
    },

    #[error("query failed: {0}")]
    Query(#[source] Failure),

    #[error("write failed: {0}")]
    Write(#[source] WriteFailure),
}

impl StoreError {
    /// True when the engine rejected a write on a constraint (foreign key,
    /// unique, not null). That is a caller-input problem, not a storage fault.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, StoreError::Write(WriteFailure::Constraint(_)))
    }
}

/// Underlying cause shared by all three error kinds.
#[derive(Debug, Error)]
pub enum Failure {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("connection lock poisoned")]
    Poisoned,

    #[error("column '{column}': {reason}")]
    Decode { column: String, reason: String },
}

#[derive(Debug, Error)]
pub enum WriteFailure {
    #[error("constraint violation: {0}")]
    Constraint(#[source] rusqlite::Error),

    #[error(transparent)]
    Execution(Failure),
}

impl From<rusqlite::Error> for WriteFailure {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _) if code.code == ErrorCode::ConstraintViolation => {
                WriteFailure::Constraint(err)
            }
            _ => WriteFailure::Execution(Failure::Sqlite(err)),
        }
    }
}

impl From<Failure> for WriteFailure {
    fn from(failure: Failure) -> Self {
        match failure {
            Failure::Sqlite(err) => err.into(),
            other => WriteFailure::Execution(other),
        }
    }
}

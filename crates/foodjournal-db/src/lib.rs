//! Local relational store for the food journal.
//!
//! A [`Store`] owns a single SQLite connection that is opened lazily on first
//! use. Concurrent first callers share one in-flight initialization. All
//! statements run on the blocking pool while the calling task awaits.

pub mod error;
mod migrations;
pub mod models;
mod queries;
mod row;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, params_from_iter};
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

pub use error::{Failure, Result, StoreError, WriteFailure};
pub use models::{JournalRow, JournalUpdate, NewJournal, UserRow};
pub use row::{Row, WriteOutcome};
pub use rusqlite::types::Value;

/// Database file name inside the data directory. Not configurable.
pub const DB_FILE_NAME: &str = "FoodJournal.db";

type SharedConn = Arc<Mutex<Connection>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Uninitialized,
    Ready,
}

pub struct Store {
    path: PathBuf,
    conn: OnceCell<SharedConn>,
    open_attempts: AtomicUsize,
}

impl Store {
    /// Build a handle for `<data_dir>/FoodJournal.db`. Nothing is opened yet.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(DB_FILE_NAME),
            conn: OnceCell::new(),
            open_attempts: AtomicUsize::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// How many times opening the database has been attempted. Stays at 1
    /// once ready, however many callers raced on first use; failed attempts
    /// add to it.
    pub fn open_attempts(&self) -> usize {
        self.open_attempts.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> StoreState {
        if self.conn.initialized() {
            StoreState::Ready
        } else {
            StoreState::Uninitialized
        }
    }

    /// Open the database and create the schema if that has not happened yet.
    /// Safe to call repeatedly and concurrently.
    pub async fn initialize(&self) -> Result<()> {
        self.connection().await.map(|_| ())
    }

    /// Run a SELECT-style statement. Rows come back in engine order.
    pub async fn execute_read(&self, sql: &str, params: Vec<Value>) -> Result<Vec<Row>> {
        let conn = self.connection().await?;
        let sql = sql.to_owned();
        debug!(sql = %sql, params = params.len(), "read");

        run_blocking(move || -> std::result::Result<Vec<Row>, Failure> {
            let conn = lock(&conn)?;
            query_rows(&conn, &sql, &params)
        })
        .await
        .map_err(|source| {
            error!("SQL query failed: {}", source);
            StoreError::Query(source)
        })
    }

    /// Run an INSERT/UPDATE/DELETE statement.
    pub async fn execute_write(&self, sql: &str, params: Vec<Value>) -> Result<WriteOutcome> {
        let conn = self.connection().await?;
        let sql = sql.to_owned();
        debug!(sql = %sql, params = params.len(), "write");

        run_blocking(move || -> std::result::Result<WriteOutcome, WriteFailure> {
            let conn = lock(&conn)?;
            let rows_affected = conn.execute(&sql, params_from_iter(params.iter()))?;
            Ok(WriteOutcome {
                rows_affected,
                last_insert_id: conn.last_insert_rowid(),
            })
        })
        .await
        .map_err(|source| {
            match &source {
                WriteFailure::Constraint(e) => error!("SQL write rejected by constraint: {}", e),
                WriteFailure::Execution(e) => error!("SQL write failed: {}", e),
            }
            StoreError::Write(source)
        })
    }

    async fn connection(&self) -> Result<SharedConn> {
        let conn = self.conn.get_or_try_init(|| self.open()).await?;
        Ok(Arc::clone(conn))
    }

    async fn open(&self) -> Result<SharedConn> {
        self.open_attempts.fetch_add(1, Ordering::SeqCst);
        let path = self.path.clone();

        match run_blocking(move || open_blocking(&path)).await {
            Ok(conn) => {
                info!("Database opened at {}", self.path.display());
                Ok(Arc::new(Mutex::new(conn)))
            }
            Err(source) => {
                error!("Database initialization failed at {}: {}", self.path.display(), source);
                Err(StoreError::Init {
                    path: self.path.clone(),
                    source,
                })
            }
        }
    }
}

fn open_blocking(path: &Path) -> std::result::Result<Connection, Failure> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut conn = Connection::open(path)?;
    migrations::configure(&conn)?;
    migrations::run(&mut conn)?;
    Ok(conn)
}

fn query_rows(conn: &Connection, sql: &str, params: &[Value]) -> std::result::Result<Vec<Row>, Failure> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Arc<[String]> = stmt
        .column_names()
        .into_iter()
        .map(String::from)
        .collect::<Vec<_>>()
        .into();

    let mut rows = stmt.query(params_from_iter(params.iter()))?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let values = (0..columns.len())
            .map(|idx| row.get::<_, Value>(idx))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        out.push(Row::new(Arc::clone(&columns), values));
    }
    Ok(out)
}

fn lock(conn: &Mutex<Connection>) -> std::result::Result<MutexGuard<'_, Connection>, Failure> {
    conn.lock().map_err(|_| Failure::Poisoned)
}

async fn run_blocking<T, E, F>(f: F) -> std::result::Result<T, E>
where
    F: FnOnce() -> std::result::Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: From<Failure> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result,
        Err(join) => Err(Failure::Task(join).into()),
    }
}

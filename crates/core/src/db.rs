//! SQLite database handle and schema bootstrap.
//!
//! [`Database`] wraps a single `rusqlite::Connection` behind a mutex so that
//! the services can share it across request handlers. Every write is one lock
//! acquisition; patient creation additionally runs inside a transaction (see
//! `repositories::patients`).

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rusqlite::Connection;

use crate::error::PatientResult;

/// Shared handle to the patient-records database.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens (creating if necessary) the database at `path` and brings the
    /// schema up to date.
    ///
    /// # Errors
    ///
    /// Returns a database error if the file cannot be opened or the bootstrap
    /// SQL fails.
    pub fn open(path: &Path) -> PatientResult<Self> {
        let conn = Connection::open(path)?;
        configure_pragmas(&conn)?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens an in-memory database (for testing).
    pub fn open_in_memory() -> PatientResult<Self> {
        let conn = Connection::open_in_memory()?;
        configure_pragmas(&conn)?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Locks the underlying connection.
    ///
    /// A poisoned lock is recovered rather than propagated: the connection
    /// holds no invariant that outlives a panicking holder.
    pub(crate) fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn configure_pragmas(conn: &Connection) -> PatientResult<()> {
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    Ok(())
}

/// Runs all pending migrations.
pub(crate) fn run_migrations(conn: &Connection) -> PatientResult<()> {
    let current_version = get_current_version(conn);

    let migrations: [(i64, &str); 1] =
        [(1, include_str!("../resources/migrations/001_initial.sql"))];

    for (version, sql) in migrations {
        if version > current_version {
            tracing::info!("Running migration v{version}");
            conn.execute_batch(sql)?;
        }
    }

    Ok(())
}

/// Current schema version (0 if no schema exists yet).
fn get_current_version(conn: &Connection) -> i64 {
    conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get::<_, i64>(0)
    })
    .unwrap_or(0)
}

/// Connection Management Module
///
/// `DatabaseAccessor` owns at most one SQLite connection to a named database
/// file. It opens and closes that connection, runs statements and scripts
/// against it, commits each execution and logs every outcome.

use crate::config::DatabaseConfig;
use crate::core::db::query::{self, Cursor};
use crate::core::db::schema::Schema;
use crate::core::{AccessError, Result};
use rusqlite::{Connection, Params};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

/// Lifecycle state of an accessor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Closed,
    Open,
}

/// Owns one connection handle to a database file.
///
/// The accessor moves between `Closed` and `Open` through [`open`](Self::open)
/// and [`close`](Self::close) and may be reopened any number of times. Any
/// connection still open when the accessor is dropped is closed then.
#[derive(Debug)]
pub struct DatabaseAccessor {
    path: PathBuf,
    foreign_keys: bool,
    busy_timeout: Option<Duration>,
    connection: Option<Connection>,
}

impl DatabaseAccessor {
    /// Creates a closed accessor for the database at `path`.
    ///
    /// Foreign-key enforcement is enabled for every session opened by it.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        DatabaseAccessor {
            path: path.as_ref().to_path_buf(),
            foreign_keys: true,
            busy_timeout: None,
            connection: None,
        }
    }

    /// Creates a closed accessor from the `[database]` configuration section.
    pub fn from_config(config: &DatabaseConfig) -> Self {
        DatabaseAccessor {
            path: config.path.clone(),
            foreign_keys: config.foreign_keys,
            busy_timeout: config.busy_timeout_ms.map(Duration::from_millis),
            connection: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.connection.is_some()
    }

    pub fn state(&self) -> ConnectionState {
        if self.is_open() {
            ConnectionState::Open
        } else {
            ConnectionState::Closed
        }
    }

    /// Opens the database file, creating it when absent.
    ///
    /// Foreign-key enforcement is switched on for the session before the
    /// connection is recorded. An accessor that is already open has its
    /// current connection closed first.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::Database` if the file cannot be opened or the
    /// session pragmas fail. The accessor is left closed in that case.
    pub fn open(&mut self) -> Result<()> {
        if self.is_open() {
            self.close()?;
        }

        match self.connect() {
            Ok(conn) => {
                self.connection = Some(conn);
                info!("connection established to {}", self.path.display());
                Ok(())
            }
            Err(e) => {
                error!("connection failure to {}: {}", self.path.display(), e);
                Err(AccessError::Database(e))
            }
        }
    }

    fn connect(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open(&self.path)?;
        if self.foreign_keys {
            // Referential actions such as ON DELETE SET NULL only fire with this on.
            conn.pragma_update(None, "foreign_keys", true)?;
        }
        if let Some(timeout) = self.busy_timeout {
            conn.busy_timeout(timeout)?;
        }
        Ok(conn)
    }

    /// Runs one statement with bound parameters and commits it.
    ///
    /// Any transaction open after the statement completes is committed, so
    /// work stays durable even after a caller issues a bare `BEGIN`.
    /// Pass `[]` for statements without placeholders. Values supplied by
    /// callers belong in `params`, never spliced into `sql`.
    ///
    /// # Errors
    ///
    /// `AccessError::NotOpen` when no connection is open, or
    /// `AccessError::Database` when the engine rejects the statement.
    /// Statements committed by earlier calls are unaffected by a failure.
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> Result<Cursor> {
        let conn = self.connection()?;
        match query::run_statement(conn, sql, params) {
            Ok(cursor) => {
                info!("execution successful: {}", sql.trim());
                Ok(cursor)
            }
            Err(e) => {
                error!("execution failure: {}: {}", sql.trim(), e);
                Err(AccessError::Database(e))
            }
        }
    }

    /// Runs a semicolon-delimited multi-statement script and commits once.
    ///
    /// The script cannot bind parameters. It may manage its own transaction
    /// with `BEGIN ... COMMIT`; such a transaction is rolled back when one of
    /// its statements fails.
    pub fn execute_script(&self, script: &str) -> Result<Cursor> {
        let conn = self.connection()?;
        match query::run_script(conn, script) {
            Ok(cursor) => {
                info!("execution successful: {}", script.trim());
                Ok(cursor)
            }
            Err(e) => {
                error!("execution failure: {}: {}", script.trim(), e);
                Err(AccessError::Database(e))
            }
        }
    }

    /// Closes the connection and clears the handle.
    ///
    /// Closing a closed accessor does nothing. The handle is cleared even
    /// when the engine reports an error while closing.
    pub fn close(&mut self) -> Result<()> {
        let Some(conn) = self.connection.take() else {
            return Ok(());
        };

        match conn.close() {
            Ok(()) => {
                info!("close connection successful to {}", self.path.display());
                Ok(())
            }
            Err((_conn, e)) => {
                warn!("close connection failure to {}: {}", self.path.display(), e);
                Err(AccessError::Database(e))
            }
        }
    }

    /// Opens the accessor, runs `f`, and closes it again on every exit path.
    ///
    /// When `f` fails its error is returned and a close error is only logged;
    /// otherwise a close error is returned.
    pub fn with_open<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        self.open()?;
        let result = f(self);
        let closed = self.close();
        match result {
            Ok(value) => closed.map(|_| value),
            Err(e) => Err(e),
        }
    }

    /// Introspects the schema of the open database.
    pub fn schema(&self) -> Result<Schema> {
        Schema::from_connection(self.connection()?)
    }

    /// Borrows the open connection for work the accessor does not wrap.
    pub fn connection(&self) -> Result<&Connection> {
        self.connection
            .as_ref()
            .ok_or_else(|| AccessError::NotOpen(self.path.display().to_string()))
    }
}

impl Drop for DatabaseAccessor {
    fn drop(&mut self) {
        if self.is_open() {
            let _ = self.close();
        }
    }
}

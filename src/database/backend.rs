//! Backend connection acquisition.
//!
//! Concrete storage backends differ only in how they construct a new
//! physical connection and in a couple of capability flags; everything
//! above that seam is shared. [`ConnectionSource`] is that seam, and
//! [`SqliteBackend`] is the embedded-file implementation.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::Connection;

use crate::error::Result;

/// A source of physical database connections.
///
/// The account store owns at most one connection at a time and asks its
/// source for a replacement whenever the current one is missing or has
/// been discarded after a failed liveness probe.
pub trait ConnectionSource: Send + Sync {
    /// Opens a new physical connection, fully configured for use.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    fn connect(&self) -> Result<Connection>;

    /// Reports whether `table` already exists on the given connection.
    ///
    /// Used by schema initialization to distinguish a fresh install from
    /// a pre-existing database before any tables are created.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata query fails.
    fn table_exists(&self, conn: &Connection, table: &str) -> Result<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Whether the backend supports in-place column redefinition
    /// (`ALTER TABLE ... MODIFY`).
    ///
    /// Backends without this capability simply skip the column-widening
    /// step of the schema migration.
    fn supports_column_modify(&self) -> bool {
        false
    }
}

/// A `SQLite` connection source.
///
/// File-backed by default; an in-memory variant exists for tests and
/// ephemeral deployments. Every connection is opened with WAL journal
/// mode, `synchronous = NORMAL`, and the configured busy timeout.
///
/// # Examples
///
/// ```no_run
/// use ingot::SqliteBackend;
///
/// let backend = SqliteBackend::file("/var/lib/ingot/economy.db");
/// ```
#[derive(Debug, Clone)]
pub struct SqliteBackend {
    path: Option<PathBuf>,
    busy_timeout: Duration,
}

impl SqliteBackend {
    /// Creates a file-backed `SQLite` source.
    ///
    /// The parent directory is created on connect if it does not exist.
    #[must_use]
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            busy_timeout: Duration::from_millis(5000),
        }
    }

    /// Creates an in-memory `SQLite` source.
    ///
    /// Each connection is an independent empty database, so data does
    /// not survive a connection replacement. Intended for tests.
    #[must_use]
    pub fn memory() -> Self {
        Self {
            path: None,
            busy_timeout: Duration::from_millis(5000),
        }
    }

    /// Sets the busy timeout applied to every connection.
    #[must_use]
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }
}

impl ConnectionSource for SqliteBackend {
    fn connect(&self) -> Result<Connection> {
        let conn = match &self.path {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        fs::create_dir_all(parent)?;
                    }
                }
                Connection::open(path)?
            }
            None => Connection::open_in_memory()?,
        };

        // PRAGMA journal_mode returns a result row, so query_row is required
        let _: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        conn.execute_batch("PRAGMA synchronous = NORMAL")?;
        conn.execute_batch(&format!(
            "PRAGMA busy_timeout = {}",
            self.busy_timeout.as_millis()
        ))?;

        Ok(conn)
    }
}

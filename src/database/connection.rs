//! Connection lifecycle management for the account store.
//!
//! The store owns a single physical connection behind a mutex. The
//! connection is opened lazily, schema-checked on every (re)open, probed
//! periodically for liveness, and replaced transparently after a
//! detected failure. Connection replacement is a critical section: the
//! foreground operations and the background probe serialize on the same
//! lock.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rusqlite::Connection;

use crate::error::{Error, Result};
use crate::scheduler::Scheduler;

use super::backend::ConnectionSource;
use super::config::{SchemaNames, StoreConfig};
use super::migrations::{self, IdentityResolver};

/// Persistent storage for player account balances.
///
/// `AccountStore` is the entire public surface of the persistence layer:
/// it manages the connection, keeps the schema current, and exposes the
/// repository operations. It is `Send + Sync`; concurrent callers
/// serialize on the internal connection lock.
///
/// # Examples
///
/// ```no_run
/// use ingot::{AccountStore, NullResolver, SqliteBackend, StoreConfig};
///
/// let store = AccountStore::new(
///     Box::new(SqliteBackend::file("/var/lib/ingot/economy.db")),
///     Box::new(NullResolver),
///     StoreConfig::new(),
/// ).unwrap();
///
/// store.save("alice", None, 30.0);
/// assert_eq!(store.load_balance("alice", None), Some(30.0));
/// ```
pub struct AccountStore {
    backend: Box<dyn ConnectionSource>,
    resolver: Box<dyn IdentityResolver>,
    config: StoreConfig,
    conn: Mutex<Option<Connection>>,
}

impl std::fmt::Debug for AccountStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AccountStore {
    /// Creates a store over the given backend and identity resolver.
    ///
    /// No connection is opened yet; the first operation (or an explicit
    /// [`ensure_connected`](Self::ensure_connected)) opens one and runs
    /// schema initialization.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured schema names fail validation.
    pub fn new(
        backend: Box<dyn ConnectionSource>,
        resolver: Box<dyn IdentityResolver>,
        config: StoreConfig,
    ) -> Result<Self> {
        config.names.validate()?;
        Ok(Self {
            backend,
            resolver,
            config,
            conn: Mutex::new(None),
        })
    }

    /// Returns the store configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub(super) fn names(&self) -> &SchemaNames {
        &self.config.names
    }

    /// Ensures a usable, schema-checked connection is available.
    ///
    /// Opens a fresh connection if none is held, running schema
    /// initialization and any pending migration before the connection is
    /// trusted. Returns true iff the store is ready afterwards; failures
    /// are logged, never raised.
    pub fn ensure_connected(&self) -> bool {
        let mut slot = self.lock_conn();
        match self.ensure_ready(&mut slot) {
            Ok(_) => true,
            Err(err) => {
                log::warn!("account store unavailable: {err}");
                false
            }
        }
    }

    /// Issues a liveness probe against the open connection, if any.
    ///
    /// On failure the connection is discarded; the replacement is
    /// acquired lazily by the next real operation rather than here.
    /// Intended to run from a low-frequency background task.
    pub fn probe(&self) {
        let mut slot = self.lock_conn();
        if let Some(conn) = slot.as_ref() {
            if let Err(err) = conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)) {
                log::warn!("liveness probe failed, discarding connection: {err}");
                *slot = None;
            }
        }
    }

    /// Installs the recurring liveness probe on a scheduler.
    ///
    /// The task holds only a weak reference, so dropping the last
    /// `Arc<AccountStore>` turns the probe into a no-op.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::sync::Arc;
    /// use ingot::{AccountStore, NullResolver, SqliteBackend, StoreConfig, ThreadScheduler};
    ///
    /// let store = Arc::new(AccountStore::new(
    ///     Box::new(SqliteBackend::file("/var/lib/ingot/economy.db")),
    ///     Box::new(NullResolver),
    ///     StoreConfig::new(),
    /// ).unwrap());
    ///
    /// store.spawn_probe(&ThreadScheduler);
    /// ```
    pub fn spawn_probe(self: &Arc<Self>, scheduler: &dyn Scheduler) {
        let period = self.config.probe_interval;
        let store = Arc::downgrade(self);
        scheduler.schedule_repeating(
            Box::new(move || {
                if let Some(store) = store.upgrade() {
                    store.probe();
                }
            }),
            period,
            period,
        );
    }

    /// Releases the connection.
    ///
    /// Idempotent; safe to call when no connection is open. A later
    /// operation transparently reconnects.
    pub fn close(&self) {
        let mut slot = self.lock_conn();
        *slot = None;
    }

    /// Reads the stored schema generation.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection can be acquired or the version
    /// table cannot be read.
    pub fn try_schema_version(&self) -> Result<i64> {
        let mut slot = self.lock_conn();
        let conn = self.ensure_ready(&mut slot)?;
        migrations::read_version(&self.config.names, conn)
    }

    /// Locks the connection slot, recovering from a poisoned lock.
    ///
    /// A panicked holder can only have left the slot with either a usable
    /// connection or `None`; both are safe states to continue from.
    pub(super) fn lock_conn(&self) -> MutexGuard<'_, Option<Connection>> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the live connection, opening and schema-checking a new one
    /// if the slot is empty.
    pub(super) fn ensure_ready<'a>(
        &self,
        slot: &'a mut Option<Connection>,
    ) -> Result<&'a mut Connection> {
        if slot.is_none() {
            let conn = self.backend.connect()?;
            migrations::ensure_schema(
                self.backend.as_ref(),
                self.resolver.as_ref(),
                &self.config.names,
                &conn,
            )?;
            *slot = Some(conn);
        }
        slot.as_mut().ok_or(Error::NotConnected)
    }
}

#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # ingot
//!
//! A persistence layer for server-side game economy account balances.
//!
//! This library stores player accounts in a relational database and
//! exposes the CRUD-style operations the rest of an economy system
//! consumes: load, save, delete, rank, and prune. It maintains a single
//! long-lived connection across an unreliable environment, detects and
//! recovers from dropped connections, performs idempotent first-run
//! schema creation, and runs a one-time identifier migration for
//! databases written before stable player identifiers existed.
//!
//! ## Core Types
//!
//! - [`AccountStore`]: the storage layer and its repository operations
//! - [`Account`]: an independent in-memory copy of one stored balance
//! - [`SqliteBackend`] and [`ConnectionSource`]: backend connection seam
//! - [`IdentityResolver`] and [`Presence`]: migration and prune collaborators
//! - [`StoreConfig`] and [`SchemaNames`]: deployment configuration
//! - [`Error`] and [`Result`]: error handling types
//!
//! ## Examples
//!
//! ```no_run
//! use ingot::{AccountStore, NullResolver, SqliteBackend, StoreConfig};
//!
//! let store = AccountStore::new(
//!     Box::new(SqliteBackend::file("/var/lib/ingot/economy.db")),
//!     Box::new(NullResolver),
//!     StoreConfig::new(),
//! ).unwrap();
//!
//! store.save("alice", None, 30.0);
//! assert_eq!(store.load_balance("alice", None), Some(30.0));
//! ```
//!
//! ## Failure model
//!
//! Nothing below the repository boundary escapes as a panic: the
//! default-named operations degrade to empty results plus a log line,
//! favoring availability over strict error visibility. The `try_`
//! variants on [`AccountStore`] expose the structured [`Error`] instead.

pub mod account;
pub mod database;
pub mod error;
pub mod scheduler;

// Re-export key types at crate root for convenience
pub use account::Account;
pub use database::{
    AccountStore, ConnectionSource, IdentityResolver, NullResolver, Presence, SchemaNames,
    SqliteBackend, StoreConfig,
};
pub use error::{Error, Result};
pub use scheduler::{Scheduler, ThreadScheduler};

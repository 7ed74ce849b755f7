//! Storage layer for persistent account balances.
//!
//! This module provides a `SQLite`-based persistence layer for player
//! economy accounts, including connection lifecycle management, schema
//! versioning with a one-time identifier migration, and the repository
//! operations consumed by the rest of the system.
//!
//! # Examples
//!
//! ```no_run
//! use ingot::{AccountStore, NullResolver, SqliteBackend, StoreConfig};
//!
//! let store = AccountStore::new(
//!     Box::new(SqliteBackend::file("/tmp/economy.db")),
//!     Box::new(NullResolver),
//!     StoreConfig::new(),
//! ).unwrap();
//!
//! store.save("alice", Some("069a79f4-44e9-4726-a5be-fca90e38aaf5"), 30.0);
//! for account in store.load_top(5) {
//!     println!("{account}");
//! }
//! ```

mod backend;
mod config;
mod connection;
mod migrations;
mod operations;
mod schema;

#[cfg(test)]
pub mod test_util;

// Re-export public API
pub use backend::{ConnectionSource, SqliteBackend};
pub use config::{SchemaNames, StoreConfig};
pub use connection::AccountStore;
pub use migrations::{IdentityResolver, NullResolver};
pub use operations::Presence;

//! Shared test utilities for database unit tests.
//!
//! This module provides helper functions used across multiple database
//! test modules.

use std::collections::HashMap;

use tempfile::TempDir;

use crate::database::backend::SqliteBackend;
use crate::database::config::StoreConfig;
use crate::database::connection::AccountStore;
use crate::database::migrations::{IdentityResolver, NullResolver};

/// Creates a file-backed store in a temporary directory.
///
/// Returns the directory guard alongside the store so the database file
/// survives connection replacement for the duration of the test.
///
/// # Panics
///
/// Panics if the temporary directory or store cannot be created. This is
/// acceptable in test code where we want to fail fast.
#[must_use]
pub fn file_store() -> (AccountStore, TempDir) {
    file_store_with_config(StoreConfig::new())
}

/// Creates a file-backed store with a custom configuration.
///
/// # Panics
///
/// Panics if the temporary directory or store cannot be created.
#[must_use]
pub fn file_store_with_config(config: StoreConfig) -> (AccountStore, TempDir) {
    let dir = TempDir::new().unwrap();
    let backend = SqliteBackend::file(dir.path().join("economy.db"));
    let store = AccountStore::new(Box::new(backend), Box::new(NullResolver), config).unwrap();
    (store, dir)
}

/// An identity resolver backed by a fixed name-to-identifier map.
#[derive(Debug, Default)]
pub struct MapResolver {
    entries: HashMap<String, String>,
}

impl MapResolver {
    /// Builds a resolver from `(name, uuid)` pairs.
    #[must_use]
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            entries: pairs
                .iter()
                .map(|(name, uuid)| ((*name).to_string(), (*uuid).to_string()))
                .collect(),
        }
    }
}

impl IdentityResolver for MapResolver {
    fn resolve(&self, name: &str) -> Option<String> {
        self.entries.get(name).cloned()
    }
}

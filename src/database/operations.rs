//! Repository operations over the accounts table.
//!
//! Every operation first ensures a live connection; when one cannot be
//! acquired the operation is abandoned rather than raised. The
//! default-named methods absorb all failures at this boundary — a log
//! line plus an empty result — which keeps the game running through a
//! storage outage. Each has a `try_`-prefixed twin returning `Result`
//! for callers that want the structured error.
//!
//! Matching policy: the identifier takes precedence over the name
//! whenever both are available (identifiers are stable, names are not),
//! and every comparison is case-insensitive.

use rusqlite::{params, params_from_iter};

use crate::account::Account;
use crate::error::Result;

use super::connection::AccountStore;
use super::schema;

/// Reports whether a player is currently connected to the game.
///
/// Consumed by [`AccountStore::prune`]: accounts still at the default
/// starting balance are only deleted for players who are offline.
pub trait Presence {
    /// Returns true if the named player is currently online.
    fn is_online(&self, name: &str) -> bool;
}

impl<F> Presence for F
where
    F: Fn(&str) -> bool,
{
    fn is_online(&self, name: &str) -> bool {
        self(name)
    }
}

fn row_to_account(row: &rusqlite::Row<'_>) -> rusqlite::Result<Account> {
    let name: String = row.get(0)?;
    let uuid: Option<String> = row.get(1)?;
    let balance: f64 = row.get(2)?;
    Ok(Account {
        name,
        uuid,
        balance,
    })
}

impl AccountStore {
    /// Loads every stored account, in storage order.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection can be acquired or the query
    /// fails.
    pub fn try_load_all(&self) -> Result<Vec<Account>> {
        let mut slot = self.lock_conn();
        let conn = self.ensure_ready(&mut slot)?;

        let mut stmt = conn.prepare(&schema::select_all(self.names()))?;
        let accounts = stmt
            .query_map([], row_to_account)?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(accounts)
    }

    /// Loads every stored account; empty on failure.
    #[must_use]
    pub fn load_all(&self) -> Vec<Account> {
        self.try_load_all().unwrap_or_else(|err| {
            log::warn!("failed to load accounts: {err}");
            Vec::new()
        })
    }

    /// Loads up to `limit` accounts ordered by balance descending.
    ///
    /// Equal balances come back in storage order.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection can be acquired or the query
    /// fails.
    #[allow(clippy::cast_possible_wrap)]
    pub fn try_load_top(&self, limit: usize) -> Result<Vec<Account>> {
        let mut slot = self.lock_conn();
        let conn = self.ensure_ready(&mut slot)?;

        let mut stmt = conn.prepare(&schema::select_top(self.names()))?;
        let accounts = stmt
            .query_map([limit as i64], row_to_account)?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(accounts)
    }

    /// Loads the top accounts by balance; empty on failure.
    #[must_use]
    pub fn load_top(&self, limit: usize) -> Vec<Account> {
        self.try_load_top(limit).unwrap_or_else(|err| {
            log::warn!("failed to load top accounts: {err}");
            Vec::new()
        })
    }

    /// Looks up one account's balance.
    ///
    /// Matches on the identifier when one is provided, else on the name;
    /// both case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection can be acquired or the query
    /// fails. A missing account is `Ok(None)`, not an error.
    pub fn try_load_balance(&self, name: &str, uuid: Option<&str>) -> Result<Option<f64>> {
        let mut slot = self.lock_conn();
        let conn = self.ensure_ready(&mut slot)?;

        let key = uuid.unwrap_or(name);
        let sql = schema::select_balance(self.names(), uuid.is_some());
        match conn.query_row(&sql, [key], |row| row.get(0)) {
            Ok(balance) => Ok(Some(balance)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Looks up one account's balance; `None` on failure or when absent.
    #[must_use]
    pub fn load_balance(&self, name: &str, uuid: Option<&str>) -> Option<f64> {
        self.try_load_balance(name, uuid).unwrap_or_else(|err| {
            log::warn!("failed to load balance for '{name}': {err}");
            None
        })
    }

    /// Upserts an account.
    ///
    /// Attempts an update matched on the identifier (when present) or
    /// the name, refreshing the stored name as a side effect; inserts a
    /// new row when nothing matched.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection can be acquired or either
    /// statement fails.
    pub fn try_save(&self, name: &str, uuid: Option<&str>, balance: f64) -> Result<()> {
        let mut slot = self.lock_conn();
        let conn = self.ensure_ready(&mut slot)?;

        let key = uuid.unwrap_or(name);
        let updated = conn.execute(
            &schema::update_account(self.names(), uuid.is_some()),
            params![balance, name, key],
        )?;

        if updated == 0 {
            conn.execute(
                &schema::insert_account(self.names()),
                params![name, uuid, balance],
            )?;
        }

        Ok(())
    }

    /// Upserts an account; logged no-op on failure.
    pub fn save(&self, name: &str, uuid: Option<&str>, balance: f64) {
        if let Err(err) = self.try_save(name, uuid, balance) {
            log::warn!("failed to save account '{name}': {err}");
        }
    }

    /// Deletes the matching account rows.
    ///
    /// Returns the number of rows deleted; zero when nothing matched.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection can be acquired or the delete
    /// fails.
    pub fn try_remove(&self, name: &str, uuid: Option<&str>) -> Result<usize> {
        let mut slot = self.lock_conn();
        let conn = self.ensure_ready(&mut slot)?;

        let key = uuid.unwrap_or(name);
        let deleted = conn.execute(&schema::delete_account(self.names(), uuid.is_some()), [key])?;
        Ok(deleted)
    }

    /// Deletes the matching account rows; returns true if any row was
    /// deleted, false when nothing matched or on failure.
    pub fn remove(&self, name: &str, uuid: Option<&str>) -> bool {
        match self.try_remove(name, uuid) {
            Ok(deleted) => deleted > 0,
            Err(err) => {
                log::warn!("failed to remove account '{name}': {err}");
                false
            }
        }
    }

    /// Deletes every account row.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection can be acquired or the delete
    /// fails.
    pub fn try_remove_all(&self) -> Result<usize> {
        let mut slot = self.lock_conn();
        let conn = self.ensure_ready(&mut slot)?;

        let deleted = conn.execute(&schema::delete_all_accounts(self.names()), [])?;
        Ok(deleted)
    }

    /// Deletes every account row; returns the number deleted, zero on
    /// failure.
    pub fn remove_all(&self) -> usize {
        self.try_remove_all().unwrap_or_else(|err| {
            log::warn!("failed to remove accounts: {err}");
            0
        })
    }

    /// Deletes accounts still at the default starting balance whose
    /// player is offline.
    ///
    /// The offline rows are removed in a single batched delete. Rows
    /// above or below the default balance are always retained, as are
    /// rows for players currently online. Returns the number of rows
    /// deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection can be acquired or a statement
    /// fails.
    pub fn try_prune(&self, presence: &dyn Presence) -> Result<usize> {
        let mut slot = self.lock_conn();
        let conn = self.ensure_ready(&mut slot)?;

        let mut stmt = conn.prepare(&schema::select_names_at_balance(self.names()))?;
        let candidates = stmt
            .query_map([self.config().default_balance], |row| {
                row.get::<_, String>(0)
            })?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        drop(stmt);

        let stale: Vec<String> = candidates
            .into_iter()
            .filter(|name| !presence.is_online(name))
            .collect();

        if stale.is_empty() {
            return Ok(0);
        }

        let deleted = conn.execute(
            &schema::delete_names_in(self.names(), stale.len()),
            params_from_iter(stale.iter()),
        )?;
        Ok(deleted)
    }

    /// Prunes default-balance offline accounts; returns the number
    /// deleted, zero on failure.
    pub fn prune(&self, presence: &dyn Presence) -> usize {
        self.try_prune(presence).unwrap_or_else(|err| {
            log::warn!("failed to prune accounts: {err}");
            0
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_util::{file_store, file_store_with_config};
    use crate::StoreConfig;

    #[test]
    fn test_save_and_load_balance() {
        let (store, _dir) = file_store();
        store.save("alice", None, 10.0);
        assert_eq!(store.load_balance("alice", None), Some(10.0));
        assert_eq!(store.load_balance("nobody", None), None);
    }

    #[test]
    fn test_save_is_upsert_by_name() {
        let (store, _dir) = file_store();
        store.save("alice", None, 10.0);
        store.save("alice", None, 20.0);

        let all = store.load_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].balance, 20.0);
    }

    #[test]
    fn test_save_matches_uuid_case_insensitively() {
        let (store, _dir) = file_store();
        store.save("alice", Some("U1"), 5.0);
        store.save("ALICE", Some("u1"), 7.0);

        let all = store.load_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].balance, 7.0);
        // The stored name was refreshed by the second save
        assert_eq!(all[0].name, "ALICE");
    }

    #[test]
    fn test_uuid_takes_precedence_over_name() {
        let (store, _dir) = file_store();
        store.save("alice", Some("u-1"), 5.0);

        // Same uuid under a new name updates the existing row
        store.save("renamed", Some("u-1"), 9.0);
        let all = store.load_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "renamed");

        // Lookup by uuid works regardless of the name passed
        assert_eq!(store.load_balance("whoever", Some("u-1")), Some(9.0));
    }

    #[test]
    fn test_load_balance_name_case_insensitive() {
        let (store, _dir) = file_store();
        store.save("Alice", None, 12.0);
        assert_eq!(store.load_balance("aLiCe", None), Some(12.0));
    }

    #[test]
    fn test_load_all_storage_order() {
        let (store, _dir) = file_store();
        store.save("carol", None, 3.0);
        store.save("alice", None, 1.0);
        store.save("bob", None, 2.0);

        let all = store.load_all();
        let names: Vec<&str> = all.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["carol", "alice", "bob"]);
    }

    #[test]
    fn test_load_top_orders_and_limits() {
        let (store, _dir) = file_store();
        store.save("a", None, 5.0);
        store.save("b", None, 20.0);
        store.save("c", None, 1.0);
        store.save("d", None, 20.0);

        let top = store.load_top(2);
        assert_eq!(top.len(), 2);
        // Ties broken by storage order: b was stored before d
        assert_eq!(top[0].name, "b");
        assert_eq!(top[0].balance, 20.0);
        assert_eq!(top[1].name, "d");
        assert_eq!(top[1].balance, 20.0);
    }

    #[test]
    fn test_load_top_zero() {
        let (store, _dir) = file_store();
        store.save("a", None, 5.0);
        assert!(store.load_top(0).is_empty());
    }

    #[test]
    fn test_remove_by_name_and_uuid() {
        let (store, _dir) = file_store();
        store.save("alice", Some("u-1"), 10.0);
        store.save("bob", None, 20.0);

        assert!(store.remove("ALICE", Some("U-1")));
        assert!(!store.remove("alice", Some("u-1")));
        assert!(store.remove("BOB", None));
        assert!(store.load_all().is_empty());
    }

    #[test]
    fn test_remove_all() {
        let (store, _dir) = file_store();
        store.save("alice", None, 10.0);
        store.save("bob", None, 20.0);

        assert_eq!(store.remove_all(), 2);
        assert!(store.load_all().is_empty());
    }

    #[test]
    fn test_prune_policy() {
        let config = StoreConfig::new().with_default_balance(30.0);
        let (store, _dir) = file_store_with_config(config);

        store.save("offline_default", None, 30.0);
        store.save("online_default", None, 30.0);
        store.save("offline_rich", None, 95.0);
        store.save("offline_poor", None, 1.0);

        let deleted = store.prune(&|name: &str| name == "online_default");
        assert_eq!(deleted, 1);

        let remaining: Vec<String> = store.load_all().into_iter().map(|a| a.name).collect();
        assert_eq!(remaining, ["online_default", "offline_rich", "offline_poor"]);
    }

    #[test]
    fn test_prune_nothing_to_do() {
        let (store, _dir) = file_store();
        store.save("alice", None, 99.0);
        assert_eq!(store.prune(&|_: &str| false), 0);
        assert_eq!(store.load_all().len(), 1);
    }

    #[test]
    fn test_legacy_row_addressed_by_name_after_partial_migration() {
        let (store, _dir) = file_store();
        // A row whose identifier was never resolved stays usable by name
        store.save("legacy", None, 40.0);
        assert_eq!(store.load_balance("legacy", None), Some(40.0));
        assert!(!store.load_all()[0].has_uuid());
    }
}

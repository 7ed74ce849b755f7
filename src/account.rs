//! Account types for tracking player balances.
//!
//! This module provides the in-memory record returned by the storage
//! layer. Records are independent copies: mutating one never affects
//! storage until it is explicitly saved.

use serde::{Deserialize, Serialize};

/// A player's stored economy balance.
///
/// Accounts are keyed by a stable player identifier (UUID) when one is
/// known, falling back to the last-known player name for rows that
/// predate the identifier migration. Names are mutable and not
/// guaranteed unique over time; identifiers are.
///
/// # Examples
///
/// ```
/// use ingot::Account;
///
/// // A fully migrated account
/// let account = Account::new("alice", Some("069a79f4-44e9-4726-a5be-fca90e38aaf5"), 30.0);
/// assert!(account.has_uuid());
///
/// // A legacy account addressed by name only
/// let legacy = Account::new("bob", None, 12.5);
/// assert!(!legacy.has_uuid());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Last-known player name.
    pub name: String,
    /// Stable player identifier, absent for pre-migration rows.
    pub uuid: Option<String>,
    /// Current currency balance.
    pub balance: f64,
}

impl Account {
    /// Creates a new account record.
    ///
    /// # Examples
    ///
    /// ```
    /// use ingot::Account;
    ///
    /// let account = Account::new("alice", None, 30.0);
    /// assert_eq!(account.name, "alice");
    /// assert_eq!(account.balance, 30.0);
    /// ```
    #[must_use]
    pub fn new(name: impl Into<String>, uuid: Option<&str>, balance: f64) -> Self {
        Self {
            name: name.into(),
            uuid: uuid.map(str::to_string),
            balance,
        }
    }

    /// Returns true if this account carries a stable identifier.
    #[must_use]
    pub fn has_uuid(&self) -> bool {
        self.uuid.is_some()
    }
}

impl std::fmt::Display for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_new() {
        let account = Account::new("alice", Some("u-1"), 42.0);
        assert_eq!(account.name, "alice");
        assert_eq!(account.uuid.as_deref(), Some("u-1"));
        assert_eq!(account.balance, 42.0);
    }

    #[test]
    fn test_account_has_uuid() {
        assert!(Account::new("alice", Some("u-1"), 0.0).has_uuid());
        assert!(!Account::new("bob", None, 0.0).has_uuid());
    }

    #[test]
    fn test_account_display() {
        let account = Account::new("alice", None, 12.5);
        assert_eq!(format!("{account}"), "alice: 12.5");
    }

    #[test]
    fn test_account_copies_are_independent() {
        let account = Account::new("alice", None, 10.0);
        let mut copy = account.clone();
        copy.balance = 99.0;
        assert_eq!(account.balance, 10.0);
    }
}

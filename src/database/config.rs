//! Storage configuration and schema naming.
//!
//! This module provides configuration types for the account store,
//! including the per-deployment table and column names interpolated into
//! SQL text. Those names come from trusted configuration, never from
//! user input, and are validated at configuration time to keep that
//! trust boundary explicit.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Table and column names for the persisted schema.
///
/// Defaults match the historical on-disk layout
/// (`fe_accounts(name, uuid, money)` and `fe_version(version)`), so an
/// unconfigured store reads databases written by earlier deployments.
///
/// # Examples
///
/// ```
/// use ingot::SchemaNames;
///
/// let names = SchemaNames::default();
/// assert_eq!(names.accounts_table, "fe_accounts");
/// names.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaNames {
    /// Name of the accounts table.
    pub accounts_table: String,
    /// Name of the schema-version table.
    pub version_table: String,
    /// Name of the player-name column in the accounts table.
    pub name_column: String,
    /// Name of the player-identifier column in the accounts table.
    pub uuid_column: String,
    /// Name of the balance column in the accounts table.
    pub money_column: String,
}

impl Default for SchemaNames {
    fn default() -> Self {
        Self {
            accounts_table: "fe_accounts".to_string(),
            version_table: "fe_version".to_string(),
            name_column: "name".to_string(),
            uuid_column: "uuid".to_string(),
            money_column: "money".to_string(),
        }
    }
}

impl SchemaNames {
    /// Validates every configured identifier.
    ///
    /// Identifiers are interpolated into SQL text, so they are restricted
    /// to ASCII alphanumeric characters and underscores, must be
    /// non-empty, and must not start with a digit.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first offending field.
    ///
    /// # Examples
    ///
    /// ```
    /// use ingot::SchemaNames;
    ///
    /// let mut names = SchemaNames::default();
    /// names.accounts_table = "accounts; DROP TABLE".to_string();
    /// assert!(names.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        validate_identifier("accounts_table", &self.accounts_table)?;
        validate_identifier("version_table", &self.version_table)?;
        validate_identifier("name_column", &self.name_column)?;
        validate_identifier("uuid_column", &self.uuid_column)?;
        validate_identifier("money_column", &self.money_column)?;
        Ok(())
    }
}

/// Checks that a configured identifier is safe to interpolate into SQL.
fn validate_identifier(field: &str, value: &str) -> Result<()> {
    let mut chars = value.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(Error::Validation {
            field: field.to_string(),
            message: format!(
                "'{value}' must be a non-empty alphanumeric/underscore identifier not starting with a digit"
            ),
        })
    }
}

/// Configuration for an account store.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use ingot::StoreConfig;
///
/// // Default settings
/// let config = StoreConfig::new();
/// assert_eq!(config.default_balance, 30.0);
///
/// // Customized settings
/// let config = StoreConfig::new()
///     .with_default_balance(100.0)
///     .with_probe_interval(Duration::from_secs(30));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Table and column names for the persisted schema.
    pub names: SchemaNames,
    /// Starting balance granted to new accounts; rows still at this
    /// balance are candidates for pruning.
    pub default_balance: f64,
    /// Interval between connection liveness probes.
    pub probe_interval: Duration,
    /// Busy timeout applied to database lock contention.
    pub busy_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            names: SchemaNames::default(),
            default_balance: 30.0,
            probe_interval: Duration::from_secs(60),
            busy_timeout: Duration::from_millis(5000),
        }
    }
}

impl StoreConfig {
    /// Creates a configuration with default settings.
    ///
    /// Default settings:
    /// - schema names: `fe_accounts(name, uuid, money)` / `fe_version(version)`
    /// - `default_balance`: 30.0
    /// - `probe_interval`: 60s
    /// - `busy_timeout`: 5000ms
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the schema table and column names.
    #[must_use]
    pub fn with_names(mut self, names: SchemaNames) -> Self {
        self.names = names;
        self
    }

    /// Sets the default starting balance.
    #[must_use]
    pub fn with_default_balance(mut self, balance: f64) -> Self {
        self.default_balance = balance;
        self
    }

    /// Sets the liveness probe interval.
    #[must_use]
    pub fn with_probe_interval(mut self, interval: Duration) -> Self {
        self.probe_interval = interval;
        self
    }

    /// Sets the busy timeout for database lock contention.
    #[must_use]
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Loads a configuration from a YAML file.
    ///
    /// Missing fields take their defaults; the schema names are
    /// validated before the configuration is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the YAML cannot be
    /// parsed, or a configured identifier fails validation.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ingot::StoreConfig;
    ///
    /// let config = StoreConfig::from_yaml_file("/etc/ingot/store.yaml").unwrap();
    /// ```
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&text)?;
        config.names.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_names_defaults() {
        let names = SchemaNames::default();
        assert_eq!(names.accounts_table, "fe_accounts");
        assert_eq!(names.version_table, "fe_version");
        assert_eq!(names.name_column, "name");
        assert_eq!(names.uuid_column, "uuid");
        assert_eq!(names.money_column, "money");
        names.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_sql_metacharacters() {
        let mut names = SchemaNames::default();
        names.accounts_table = "accounts; DROP TABLE players--".to_string();
        let err = names.validate().unwrap_err();
        assert!(format!("{err}").contains("accounts_table"));
    }

    #[test]
    fn test_validate_rejects_empty_identifier() {
        let mut names = SchemaNames::default();
        names.money_column = String::new();
        assert!(names.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_leading_digit() {
        let mut names = SchemaNames::default();
        names.uuid_column = "1uuid".to_string();
        assert!(names.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_underscore_prefix() {
        let mut names = SchemaNames::default();
        names.name_column = "_player_name".to_string();
        names.validate().unwrap();
    }

    #[test]
    fn test_config_defaults() {
        let config = StoreConfig::new();
        assert_eq!(config.default_balance, 30.0);
        assert_eq!(config.probe_interval, Duration::from_secs(60));
        assert_eq!(config.busy_timeout, Duration::from_millis(5000));
    }

    #[test]
    fn test_config_builders() {
        let config = StoreConfig::new()
            .with_default_balance(100.0)
            .with_probe_interval(Duration::from_secs(30))
            .with_busy_timeout(Duration::from_millis(250));
        assert_eq!(config.default_balance, 100.0);
        assert_eq!(config.probe_interval, Duration::from_secs(30));
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_config_from_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.yaml");
        std::fs::write(
            &path,
            "default_balance: 50.0\nnames:\n  accounts_table: eco_accounts\n",
        )
        .unwrap();

        let config = StoreConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.default_balance, 50.0);
        assert_eq!(config.names.accounts_table, "eco_accounts");
        // Unspecified fields keep their defaults
        assert_eq!(config.names.money_column, "money");
        assert_eq!(config.probe_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_config_from_yaml_file_rejects_bad_identifier() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.yaml");
        std::fs::write(&path, "names:\n  accounts_table: \"bad name\"\n").unwrap();

        assert!(StoreConfig::from_yaml_file(&path).is_err());
    }
}

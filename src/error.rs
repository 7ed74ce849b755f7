//! Error types for the ingot library.
//!
//! This module provides the error hierarchy for all storage operations,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Result type alias for operations that may fail with an ingot error.
///
/// # Examples
///
/// ```
/// use ingot::{Error, Result};
///
/// fn example_operation() -> Result<f64> {
///     Ok(30.0)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the ingot library.
///
/// This enum encompasses all error conditions that can occur while
/// persisting or loading account balances. Note that the default-named
/// repository operations on [`crate::AccountStore`] absorb these errors
/// at the storage boundary and degrade to empty results; the `try_`
/// variants surface them for programmatic inspection.
#[derive(Debug, Error)]
pub enum Error {
    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A configuration error occurred.
    #[error("configuration error: {0}")]
    Configuration(#[from] serde_yaml::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A validation error occurred.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// No usable database connection is available.
    ///
    /// Returned when a connection could not be acquired and the operation
    /// was abandoned rather than retried.
    #[error("no database connection available")]
    NotConnected,
}

impl Error {
    /// Check if the error indicates an unavailable connection.
    ///
    /// # Examples
    ///
    /// ```
    /// use ingot::Error;
    ///
    /// assert!(Error::NotConnected.is_not_connected());
    /// ```
    #[must_use]
    pub fn is_not_connected(&self) -> bool {
        matches!(self, Self::NotConnected)
    }
}

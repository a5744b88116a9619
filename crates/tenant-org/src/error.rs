//! Store error types
//!
//! Errors returned by the credential store, organization registry and
//! partition provisioner. These never reach end users directly; the
//! lifecycle layer maps them onto its own taxonomy.

use thiserror::Error;

/// Store-level failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Referenced record or partition does not exist
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Kind of record (e.g. "organization")
        entity: &'static str,
        /// Lookup key
        key: String,
    },

    /// A unique index rejected the write
    #[error("duplicate {field} for {entity}: {value}")]
    Duplicate {
        /// Kind of record
        entity: &'static str,
        /// Field carrying the unique index
        field: &'static str,
        /// Conflicting value
        value: String,
    },

    /// The step did not complete in time; its outcome is unknown
    #[error("store operation timed out: {0}")]
    Timeout(String),

    /// The store could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store handle was closed
    #[error("store handle is closed")]
    Closed,

    /// Secret hashing failed
    #[error("hashing error: {0}")]
    Crypto(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Shorthand for a `NotFound` error.
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Shorthand for a `Duplicate` error.
    pub fn duplicate(entity: &'static str, field: &'static str, value: impl ToString) -> Self {
        StoreError::Duplicate {
            entity,
            field,
            value: value.to_string(),
        }
    }

    /// Check if the record was absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Check if a uniqueness constraint rejected the write.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::Duplicate { .. })
    }

    /// Check if the failure may clear up on retry.
    ///
    /// A timed-out step is retryable only when the step is idempotent; the
    /// caller decides that.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Timeout(_) | StoreError::Unavailable(_))
    }
}

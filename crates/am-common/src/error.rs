//! Error types for the rule-mining engine.
//!
//! All engine failures surface synchronously through [`Error`]. Every
//! variant carries a stable numeric code (grouped by category, tens
//! apart) so downstream tooling can match on failures without parsing
//! messages. Persistence has its own error type in the am-bundle
//! crate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Construction-time and query-option validation errors.
    Config,
    /// Item normalization and transaction ingestion errors.
    Ingest,
    /// Prediction errors.
    Predict,
    /// Cross-index merge errors.
    Merge,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Ingest => write!(f, "ingest"),
            ErrorCategory::Predict => write!(f, "predict"),
            ErrorCategory::Merge => write!(f, "merge"),
        }
    }
}

/// Unified error type for the rule-mining engine.
///
/// Failures leave the index in its pre-call state: every failure
/// point in ingestion runs before the first trie or symbol-table
/// mutation.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("invalid configuration: {0}")]
    Config(String),

    // Ingestion errors (20-29)
    #[error("invalid item {item:?}: {reason}")]
    InvalidItem { item: String, reason: String },

    #[error("transaction has {len} items, exceeding the maximum subset length {max_len}")]
    MaxLenExceeded { len: usize, max_len: usize },

    // Prediction errors (30-39)
    #[error("unknown antecedent: {0:?}")]
    UnknownAntecedent(String),

    // Merge errors (40-49)
    #[error("incompatible merge: {field} differs ({left} vs {right})")]
    IncompatibleMerge {
        field: &'static str,
        left: String,
        right: String,
    },
}

impl Error {
    /// Build an [`Error::InvalidItem`] from an item and a reason.
    pub fn invalid_item(item: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidItem {
            item: item.into(),
            reason: reason.into(),
        }
    }

    /// Returns the stable error code for this error.
    ///
    /// Codes are grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Ingestion errors
    /// - 30-39: Prediction errors
    /// - 40-49: Merge errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidItem { .. } => 20,
            Error::MaxLenExceeded { .. } => 21,
            Error::UnknownAntecedent(_) => 30,
            Error::IncompatibleMerge { .. } => 40,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) => ErrorCategory::Config,
            Error::InvalidItem { .. } | Error::MaxLenExceeded { .. } => ErrorCategory::Ingest,
            Error::UnknownAntecedent(_) => ErrorCategory::Predict,
            Error::IncompatibleMerge { .. } => ErrorCategory::Merge,
        }
    }
}

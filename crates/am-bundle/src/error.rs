//! Error types for bundle operations.

use thiserror::Error;

/// Errors that can occur while writing or loading a bundle.
#[derive(Error, Debug)]
pub enum BundleError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The buffer does not start with the bundle magic
    #[error("not an ambre bundle: bad magic")]
    BadMagic,

    /// Unknown persisted schema version
    #[error("unsupported bundle schema version {found} (supported: {supported})")]
    SchemaMismatch { found: u32, supported: u32 },

    /// Trie section checksum verification failed
    #[error("trie checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    /// The buffer ends before a declared section
    #[error("bundle truncated: {0}")]
    Truncated(&'static str),

    /// Internally inconsistent bundle content
    #[error("corrupted bundle: {0}")]
    Corrupted(String),
}

/// Result type alias for bundle operations.
pub type Result<T> = std::result::Result<T, BundleError>;

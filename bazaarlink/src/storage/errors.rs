//! Error types for catalog and artifact storage

use std::error::Error;
use std::fmt;

/// Error type for storage operations
#[derive(Debug)]
pub enum StorageError {
    /// Configuration error
    Configuration(String),

    /// Connection error
    Connection(String),

    /// Query error
    Query(String),

    /// Data not found
    NotFound(String),

    /// Validation error
    Validation(String),

    /// Serialization/deserialization error
    Serialization(String),

    /// Storage timeout error
    Timeout(String),

    /// Artifact format is not understood by this build
    UnsupportedFormat(u32),

    /// Other error
    Other(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            StorageError::Connection(msg) => write!(f, "Connection error: {}", msg),
            StorageError::Query(msg) => write!(f, "Query error: {}", msg),
            StorageError::NotFound(msg) => write!(f, "Not found: {}", msg),
            StorageError::Validation(msg) => write!(f, "Validation error: {}", msg),
            StorageError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            StorageError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            StorageError::UnsupportedFormat(version) => {
                write!(f, "Unsupported artifact format version {}", version)
            }
            StorageError::Other(msg) => write!(f, "Other error: {}", msg),
        }
    }
}

impl Error for StorageError {}

/// Convert a JSON error to a storage error
impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Convert a standard IO error to a storage error
impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Query(err.to_string())
    }
}

// This allows StorageError to be converted to the top-level BazaarError
impl From<StorageError> for crate::BazaarError {
    fn from(err: StorageError) -> Self {
        crate::BazaarError::Storage(err.to_string())
    }
}

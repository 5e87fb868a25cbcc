//! Error types for the canopy library.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when querying the tree detection store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The database file was not found at the configured path.
    #[error("Tree detection database not found: {path}")]
    DatabaseNotFound { path: PathBuf },

    /// The underlying SQL query failed (driver error, schema mismatch, ...).
    #[error("Query failed: {0}")]
    Query(#[from] sqlx::Error),
}

/// Result type alias using [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::DatabaseNotFound {
            path: PathBuf::from("/data/tree_detection.db"),
        };
        assert!(err.to_string().contains("tree_detection.db"));

        let err = StoreError::Query(sqlx::Error::RowNotFound);
        assert!(err.to_string().starts_with("Query failed"));
    }
}

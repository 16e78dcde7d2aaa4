//! Store error types for cast-store.

use thiserror::Error;

/// Errors from document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A query or filter could not be built or executed.
    #[error("Query failed: {0}")]
    Query(String),

    /// A collection or index name is not a valid identifier.
    #[error("Invalid name '{0}': must be lowercase ascii, digits, underscores")]
    InvalidName(String),

    /// A schema document could not be compiled into a validator.
    #[error("Invalid schema for collection '{collection}': {reason}")]
    InvalidSchema { collection: String, reason: String },

    /// A write was rejected by the collection's attached validator.
    #[error("Document rejected by '{collection}' validator: {}", errors.join("; "))]
    SchemaViolation {
        collection: String,
        errors: Vec<String>,
    },

    /// A write violated a unique index.
    #[error("Duplicate key in '{collection}': {detail}")]
    Duplicate { collection: String, detail: String },

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),
}

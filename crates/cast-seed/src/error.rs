//! Seed engine error types.

use thiserror::Error;

/// Errors from the bootstrap/reconciliation run.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Required configuration is missing. Raised before any write.
    #[error(transparent)]
    Config(#[from] cast_config::ConfigError),

    /// An embedded content document failed to parse.
    #[error("Seed content error: {0}")]
    Content(String),

    /// The store rejected or failed an operation.
    #[error(transparent)]
    Store(#[from] cast_store::StoreError),
}

//! # cast-store
//!
//! Embedded document store for castaway bootstrap state.
//!
//! Collections are libSQL tables of `(id TEXT PRIMARY KEY, doc TEXT)` rows
//! holding JSON document bodies. A `_collections` meta table carries each
//! collection's attached JSON Schema validator; every write is validated
//! against it in strict mode and rejected on violation. Declared indexes
//! become expression indexes over `json_extract`, including partial-unique
//! indexes that exclude absent/null values.
//!
//! Uses the `libsql` crate (C `SQLite` fork): single-file local databases
//! plus `:memory:` stores for tests.

pub mod error;
pub mod filter;
pub mod index;
pub mod ops;
pub mod schema;

pub use error::StoreError;
pub use filter::Filter;
pub use index::{IndexSpec, Order, PartialFilter};
pub use ops::{Document, UpsertOutcome};
pub use schema::CollectionSchema;

use libsql::Builder;

/// Central handle for all document store operations.
///
/// Wraps a libSQL database and connection. All operations are issued and
/// awaited one at a time; there is no internal parallelism and no retry.
pub struct DocStore {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl DocStore {
    /// Open a local store at the given path (`:memory:` for tests).
    ///
    /// Creates the `_collections` meta table on first open.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the database cannot be opened or the meta
    /// table cannot be created.
    pub async fn open_local(path: &str) -> Result<Self, StoreError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS _collections (name TEXT PRIMARY KEY, schema TEXT NOT NULL)",
            (),
        )
        .await?;
        Ok(Self { db, conn })
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Check whether a collection's backing table exists.
    ///
    /// Used to feature-detect optional collections so cascade steps can be
    /// skipped instead of failing.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the catalog query fails.
    pub async fn collection_exists(&self, name: &str) -> Result<bool, StoreError> {
        check_name(name)?;
        let mut rows = self
            .conn
            .query(
                "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                [name],
            )
            .await?;
        Ok(rows.next().await?.is_some())
    }

    /// Generate a prefixed document id, e.g. `"usr-a3f8b2c1"`.
    ///
    /// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the
    /// collection's prefix.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, StoreError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
                (),
            )
            .await?;
        let row = rows.next().await?.ok_or(StoreError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }
}

/// Map a collection name to its document id prefix.
#[must_use]
pub fn id_prefix(collection: &str) -> &'static str {
    match collection {
        c if c == cast_core::collections::USERS => cast_core::ids::USER,
        c if c == cast_core::collections::POOLS => cast_core::ids::POOL,
        c if c == cast_core::collections::POOL_MEMBERSHIPS => cast_core::ids::MEMBERSHIP,
        c if c == cast_core::collections::PICKS => cast_core::ids::PICK,
        c if c == cast_core::collections::SEASONS => cast_core::ids::SEASON,
        _ => "doc",
    }
}

/// Validate a collection or index name.
///
/// Names are interpolated into SQL identifiers, so only lowercase ascii,
/// digits, and underscores are accepted, and the `_` prefix is reserved for
/// store metadata tables.
pub(crate) fn check_name(name: &str) -> Result<(), StoreError> {
    let valid_head = name.chars().next().is_some_and(|c| c.is_ascii_lowercase());
    if valid_head
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Ok(());
    }
    Err(StoreError::InvalidName(name.to_string()))
}

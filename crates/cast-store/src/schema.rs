//! Collection validators: create-with-schema, modify-schema, strict checks.
//!
//! Each collection may have one JSON Schema attached via the `_collections`
//! meta table. Enforcement is strict/error-mode: a write whose merged
//! document fails the schema is rejected and nothing is stored. Collections
//! without an attached schema accept any document.

use serde_json::Value;

use crate::DocStore;
use crate::check_name;
use crate::error::StoreError;

/// A declared schema for one collection: the required-field/type contract
/// enforced at the store level.
#[derive(Debug, Clone)]
pub struct CollectionSchema {
    pub collection: String,
    /// JSON Schema document (object type, `required`, per-field types,
    /// nested object/array schemas).
    pub schema: Value,
}

impl DocStore {
    /// Attach a validator to a collection, creating the collection if absent
    /// and replacing the attached schema if present.
    ///
    /// Idempotent: running twice with the same schema leaves the store in
    /// the same state. The schema is compiled before anything is written, so
    /// either the full schema is attached or the store is untouched.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidSchema` if the schema does not compile,
    /// or `StoreError` on query failure.
    pub async fn ensure_validator(&self, schema: &CollectionSchema) -> Result<(), StoreError> {
        check_name(&schema.collection)?;
        jsonschema::validator_for(&schema.schema).map_err(|e| StoreError::InvalidSchema {
            collection: schema.collection.clone(),
            reason: e.to_string(),
        })?;

        self.conn()
            .execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS \"{}\" (id TEXT PRIMARY KEY, doc TEXT NOT NULL)",
                    schema.collection
                ),
                (),
            )
            .await?;
        self.conn()
            .execute(
                "INSERT INTO _collections (name, schema) VALUES (?1, ?2)
                 ON CONFLICT(name) DO UPDATE SET schema = excluded.schema",
                libsql::params![schema.collection.as_str(), schema.schema.to_string()],
            )
            .await?;
        tracing::debug!(collection = %schema.collection, "validator ensured");
        Ok(())
    }

    /// Fetch the schema currently attached to a collection.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the meta query fails or the stored schema is
    /// not valid JSON.
    pub async fn attached_schema(&self, collection: &str) -> Result<Option<Value>, StoreError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT schema FROM _collections WHERE name = ?1",
                [collection],
            )
            .await?;
        let Some(row) = rows.next().await? else {
            return Ok(None);
        };
        let raw = row.get::<String>(0)?;
        let schema = serde_json::from_str(&raw)
            .map_err(|e| StoreError::Query(format!("corrupt schema for '{collection}': {e}")))?;
        Ok(Some(schema))
    }

    /// Validate a document body against the collection's attached schema.
    ///
    /// No-op for collections without a validator.
    pub(crate) async fn validate(&self, collection: &str, doc: &Value) -> Result<(), StoreError> {
        let Some(schema) = self.attached_schema(collection).await? else {
            return Ok(());
        };
        let validator =
            jsonschema::validator_for(&schema).map_err(|e| StoreError::InvalidSchema {
                collection: collection.to_string(),
                reason: e.to_string(),
            })?;
        let errors: Vec<String> = validator.iter_errors(doc).map(|e| format!("{e}")).collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(StoreError::SchemaViolation {
                collection: collection.to_string(),
                errors,
            })
        }
    }
}

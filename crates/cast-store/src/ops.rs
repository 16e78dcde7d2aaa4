//! Document operations: find, upsert, update, delete.
//!
//! Every write validates the merged document against the collection's
//! attached schema before touching the table, so strict enforcement holds
//! for inserts, upserts, and field updates alike. Unique-index violations
//! surface as `StoreError::Duplicate`.

use serde_json::{Map, Value};

use crate::DocStore;
use crate::check_name;
use crate::error::StoreError;
use crate::filter::Filter;
use crate::id_prefix;

/// A stored document: store-assigned id plus JSON body.
///
/// The id lives outside the body; filters address it as `_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub body: Map<String, Value>,
}

impl Document {
    /// Field accessor. Returns `None` for absent fields.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.body.get(name)
    }
}

/// Result of an upsert: the affected document id and whether it was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub id: String,
    pub created: bool,
}

impl DocStore {
    /// Insert a new document. An `_id` entry in the body, if present, is
    /// used as the document id; otherwise one is generated from the
    /// collection's prefix.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::SchemaViolation` if the body fails the attached
    /// validator, `StoreError::Duplicate` on unique-index violation.
    pub async fn insert_one(
        &self,
        collection: &str,
        mut body: Map<String, Value>,
    ) -> Result<String, StoreError> {
        check_name(collection)?;
        let id = match body.remove("_id") {
            Some(Value::String(s)) => s,
            Some(other) => {
                return Err(StoreError::Query(format!(
                    "non-string _id {other} in insert"
                )));
            }
            None => self.generate_id(id_prefix(collection)).await?,
        };
        self.validate(collection, &Value::Object(body.clone()))
            .await?;
        self.conn()
            .execute(
                &format!("INSERT INTO \"{collection}\" (id, doc) VALUES (?1, ?2)"),
                libsql::params![id.as_str(), Value::Object(body).to_string()],
            )
            .await
            .map_err(|e| map_write_err(collection, e))?;
        Ok(id)
    }

    /// Find the first document matching a filter.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on query failure or corrupt stored JSON.
    pub async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self.select(collection, filter, Some(1)).await?.pop())
    }

    /// Find all documents matching a filter, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on query failure or corrupt stored JSON.
    pub async fn find_many(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<Document>, StoreError> {
        self.select(collection, filter, None).await
    }

    /// Id-only projection of the documents matching a filter.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on query failure.
    pub async fn find_ids(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<String>, StoreError> {
        check_name(collection)?;
        let mut params = Vec::new();
        let cond = filter.to_sql(&mut params)?;
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT id FROM \"{collection}\" WHERE {cond} ORDER BY id"),
                libsql::params_from_iter(params),
            )
            .await?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next().await? {
            ids.push(row.get::<String>(0)?);
        }
        Ok(ids)
    }

    /// Upsert by filter with set / set-on-insert semantics.
    ///
    /// If a document matches: exactly the `set` fields are overwritten;
    /// `set_on_insert` fields are left untouched. If none matches: a new
    /// document is created from the filter's equality fields, the
    /// `set_on_insert` fields, and the `set` fields. An `_id` pinned by the
    /// filter or supplied in `set_on_insert` becomes the new document's id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::SchemaViolation` if the merged document fails
    /// the attached validator (nothing is written), `StoreError::Duplicate`
    /// on unique-index violation.
    pub async fn upsert(
        &self,
        collection: &str,
        filter: &Filter,
        set: &Map<String, Value>,
        set_on_insert: &Map<String, Value>,
    ) -> Result<UpsertOutcome, StoreError> {
        check_name(collection)?;
        if let Some(mut doc) = self.find_one(collection, filter).await? {
            for (field, value) in set {
                doc.body.insert(field.clone(), value.clone());
            }
            self.validate(collection, &Value::Object(doc.body.clone()))
                .await?;
            self.conn()
                .execute(
                    &format!("UPDATE \"{collection}\" SET doc = ?1 WHERE id = ?2"),
                    libsql::params![Value::Object(doc.body).to_string(), doc.id.as_str()],
                )
                .await
                .map_err(|e| map_write_err(collection, e))?;
            return Ok(UpsertOutcome {
                id: doc.id,
                created: false,
            });
        }

        let mut body = Map::new();
        if let Some(id) = filter.id_equality() {
            body.insert("_id".to_string(), id.clone());
        }
        for (field, value) in filter.equalities() {
            body.insert(field.to_string(), value.clone());
        }
        for (field, value) in set_on_insert {
            body.insert(field.clone(), value.clone());
        }
        for (field, value) in set {
            body.insert(field.clone(), value.clone());
        }
        let id = self.insert_one(collection, body).await?;
        Ok(UpsertOutcome { id, created: true })
    }

    /// Set one field on every document matching a filter.
    ///
    /// Each updated document is re-validated before being written. Returns
    /// the number of documents updated.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::SchemaViolation` if an updated document fails
    /// the attached validator, or `StoreError` on query failure.
    pub async fn set_field_many(
        &self,
        collection: &str,
        filter: &Filter,
        field: &str,
        value: &Value,
    ) -> Result<u64, StoreError> {
        check_name(collection)?;
        let docs = self.find_many(collection, filter).await?;
        let mut updated = 0;
        for mut doc in docs {
            doc.body.insert(field.to_string(), value.clone());
            self.validate(collection, &Value::Object(doc.body.clone()))
                .await?;
            self.conn()
                .execute(
                    &format!("UPDATE \"{collection}\" SET doc = ?1 WHERE id = ?2"),
                    libsql::params![Value::Object(doc.body).to_string(), doc.id.as_str()],
                )
                .await
                .map_err(|e| map_write_err(collection, e))?;
            updated += 1;
        }
        Ok(updated)
    }

    /// Delete the first document matching a filter. Returns whether a
    /// document was deleted.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on query failure.
    pub async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<bool, StoreError> {
        check_name(collection)?;
        let Some(doc) = self.find_one(collection, filter).await? else {
            return Ok(false);
        };
        self.conn()
            .execute(
                &format!("DELETE FROM \"{collection}\" WHERE id = ?1"),
                [doc.id],
            )
            .await?;
        Ok(true)
    }

    /// Delete every document matching a filter. Returns the count deleted.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on query failure.
    pub async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        check_name(collection)?;
        let mut params = Vec::new();
        let cond = filter.to_sql(&mut params)?;
        let deleted = self
            .conn()
            .execute(
                &format!("DELETE FROM \"{collection}\" WHERE {cond}"),
                libsql::params_from_iter(params),
            )
            .await?;
        Ok(deleted)
    }

    /// Count documents, optionally restricted by a filter.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on query failure.
    pub async fn count(
        &self,
        collection: &str,
        filter: Option<&Filter>,
    ) -> Result<u64, StoreError> {
        check_name(collection)?;
        let mut params = Vec::new();
        let cond = match filter {
            Some(f) => format!(" WHERE {}", f.to_sql(&mut params)?),
            None => String::new(),
        };
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT count(*) FROM \"{collection}\"{cond}"),
                libsql::params_from_iter(params),
            )
            .await?;
        let row = rows.next().await?.ok_or(StoreError::NoResult)?;
        let count = row.get::<i64>(0)?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn select(
        &self,
        collection: &str,
        filter: &Filter,
        limit: Option<u32>,
    ) -> Result<Vec<Document>, StoreError> {
        check_name(collection)?;
        let mut params = Vec::new();
        let cond = filter.to_sql(&mut params)?;
        let limit_clause = limit.map_or(String::new(), |n| format!(" LIMIT {n}"));
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT id, doc FROM \"{collection}\" WHERE {cond} ORDER BY id{limit_clause}"
                ),
                libsql::params_from_iter(params),
            )
            .await?;
        let mut docs = Vec::new();
        while let Some(row) = rows.next().await? {
            let id = row.get::<String>(0)?;
            let raw = row.get::<String>(1)?;
            let body: Map<String, Value> = serde_json::from_str(&raw)
                .map_err(|e| StoreError::Query(format!("corrupt document '{id}': {e}")))?;
            docs.push(Document { id, body });
        }
        Ok(docs)
    }
}

/// Distinguish unique-constraint rejections from other write failures.
fn map_write_err(collection: &str, e: libsql::Error) -> StoreError {
    let msg = e.to_string();
    if msg.contains("UNIQUE constraint failed") {
        StoreError::Duplicate {
            collection: collection.to_string(),
            detail: msg,
        }
    } else {
        StoreError::LibSql(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexSpec;
    use crate::schema::CollectionSchema;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    async fn users_store() -> DocStore {
        let store = DocStore::open_local(":memory:").await.unwrap();
        store
            .ensure_validator(&CollectionSchema {
                collection: "users".to_string(),
                schema: json!({
                    "type": "object",
                    "required": ["username", "email"],
                    "properties": {
                        "username": {"type": "string"},
                        "email": {"type": "string"},
                        "default_pool": {"type": ["string", "null"]},
                        "reset_token": {"type": ["string", "null"]}
                    }
                }),
            })
            .await
            .unwrap();
        store
            .ensure_index(&IndexSpec::new("users_email_unique", "users", &["email"]).unique())
            .await
            .unwrap();
        store
            .ensure_index(
                &IndexSpec::new("users_reset_token_unique", "users", &["reset_token"])
                    .unique()
                    .partial_string("reset_token"),
            )
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn insert_missing_required_field_rejected() {
        let store = users_store().await;
        let result = store
            .insert_one("users", obj(json!({"username": "solo"})))
            .await;
        assert!(matches!(
            result,
            Err(StoreError::SchemaViolation { .. })
        ));
        assert_eq!(store.count("users", None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn insert_wrong_type_rejected() {
        let store = users_store().await;
        let result = store
            .insert_one("users", obj(json!({"username": 7, "email": "a@b.c"})))
            .await;
        assert!(matches!(
            result,
            Err(StoreError::SchemaViolation { .. })
        ));
    }

    #[tokio::test]
    async fn unique_index_rejects_duplicate() {
        let store = users_store().await;
        store
            .insert_one(
                "users",
                obj(json!({"username": "a", "email": "same@email.com"})),
            )
            .await
            .unwrap();
        let result = store
            .insert_one(
                "users",
                obj(json!({"username": "b", "email": "same@email.com"})),
            )
            .await;
        assert!(matches!(result, Err(StoreError::Duplicate { .. })));
    }

    #[tokio::test]
    async fn partial_unique_allows_many_nulls() {
        let store = users_store().await;
        for name in ["a", "b", "c"] {
            store
                .insert_one(
                    "users",
                    obj(json!({
                        "username": name,
                        "email": format!("{name}@email.com"),
                        "reset_token": null
                    })),
                )
                .await
                .unwrap();
        }
        // Absent counts the same as null.
        store
            .insert_one(
                "users",
                obj(json!({"username": "d", "email": "d@email.com"})),
            )
            .await
            .unwrap();
        assert_eq!(store.count("users", None).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn partial_unique_rejects_duplicate_concrete_value() {
        let store = users_store().await;
        store
            .insert_one(
                "users",
                obj(json!({"username": "a", "email": "a@email.com", "reset_token": "tok-1"})),
            )
            .await
            .unwrap();
        let result = store
            .insert_one(
                "users",
                obj(json!({"username": "b", "email": "b@email.com", "reset_token": "tok-1"})),
            )
            .await;
        assert!(matches!(result, Err(StoreError::Duplicate { .. })));
    }

    #[tokio::test]
    async fn upsert_creates_from_filter_and_set_on_insert() {
        let store = users_store().await;
        let outcome = store
            .upsert(
                "users",
                &Filter::eq("username", "test1"),
                &obj(json!({"email": "test1@email.com"})),
                &obj(json!({"_id": "usr-ad79e575", "default_pool": null})),
            )
            .await
            .unwrap();
        assert!(outcome.created);
        assert_eq!(outcome.id, "usr-ad79e575");

        let doc = store
            .find_one("users", &Filter::eq("username", "test1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.field("username"), Some(&json!("test1")));
        assert_eq!(doc.field("default_pool"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn upsert_overwrites_set_but_not_set_on_insert() {
        let store = users_store().await;
        let filter = Filter::eq("username", "test1");
        store
            .upsert(
                "users",
                &filter,
                &obj(json!({"email": "old@email.com"})),
                &obj(json!({"default_pool": "pol-11111111"})),
            )
            .await
            .unwrap();

        let outcome = store
            .upsert(
                "users",
                &filter,
                &obj(json!({"email": "new@email.com"})),
                &obj(json!({"default_pool": "pol-22222222"})),
            )
            .await
            .unwrap();
        assert!(!outcome.created);

        let doc = store.find_one("users", &filter).await.unwrap().unwrap();
        assert_eq!(doc.field("email"), Some(&json!("new@email.com")));
        // set-on-insert value from the first call survives the second.
        assert_eq!(doc.field("default_pool"), Some(&json!("pol-11111111")));
    }

    #[tokio::test]
    async fn upsert_rejecting_validator_leaves_store_unchanged() {
        let store = users_store().await;
        let filter = Filter::eq("username", "ghost");
        let result = store
            .upsert("users", &filter, &obj(json!({"email": 42})), &Map::new())
            .await;
        assert!(matches!(
            result,
            Err(StoreError::SchemaViolation { .. })
        ));
        assert_eq!(store.count("users", None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn find_ids_projects_matching_documents() {
        let store = users_store().await;
        for name in ["a", "b"] {
            store
                .insert_one(
                    "users",
                    obj(json!({
                        "username": name,
                        "email": format!("{name}@email.com"),
                        "default_pool": "pol-aaaaaaaa"
                    })),
                )
                .await
                .unwrap();
        }
        store
            .insert_one(
                "users",
                obj(json!({"username": "c", "email": "c@email.com"})),
            )
            .await
            .unwrap();

        let ids = store
            .find_ids("users", &Filter::eq("default_pool", "pol-aaaaaaaa"))
            .await
            .unwrap();
        assert_eq!(ids.len(), 2);
    }

    #[tokio::test]
    async fn set_field_many_updates_all_matches() {
        let store = users_store().await;
        for name in ["a", "b"] {
            store
                .insert_one(
                    "users",
                    obj(json!({
                        "username": name,
                        "email": format!("{name}@email.com"),
                        "default_pool": "pol-gone"
                    })),
                )
                .await
                .unwrap();
        }
        let updated = store
            .set_field_many(
                "users",
                &Filter::any_of("default_pool", vec![json!("pol-gone")]),
                "default_pool",
                &Value::Null,
            )
            .await
            .unwrap();
        assert_eq!(updated, 2);
        assert_eq!(
            store
                .count("users", Some(&Filter::eq("default_pool", Value::Null)))
                .await
                .unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn delete_many_with_in_filter() {
        let store = users_store().await;
        let mut ids = Vec::new();
        for name in ["a", "b", "c"] {
            ids.push(
                store
                    .insert_one(
                        "users",
                        obj(json!({"username": name, "email": format!("{name}@email.com")})),
                    )
                    .await
                    .unwrap(),
            );
        }
        let deleted = store
            .delete_many(
                "users",
                &Filter::any_of("_id", ids[..2].iter().map(|i| json!(i)).collect()),
            )
            .await
            .unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(store.count("users", None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_one_absent_is_false() {
        let store = users_store().await;
        assert!(
            !store
                .delete_one("users", &Filter::eq("username", "nobody"))
                .await
                .unwrap()
        );
    }
}

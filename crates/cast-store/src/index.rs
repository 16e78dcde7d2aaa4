//! Declarative index management.
//!
//! Declared indexes become expression indexes over `json_extract`. A
//! partial-unique index carries a predicate restricting uniqueness to
//! documents where the field holds a concrete string value, so any number of
//! documents may share an absent or null value.

use crate::DocStore;
use crate::check_name;
use crate::error::StoreError;

/// Key sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Predicate limiting which documents participate in a partial index.
#[derive(Debug, Clone)]
pub enum PartialFilter {
    /// Field holds a concrete string value (absent/null excluded).
    StringTyped(String),
}

/// A declared index on one collection.
#[derive(Debug, Clone)]
pub struct IndexSpec {
    pub name: String,
    pub collection: String,
    pub keys: Vec<(String, Order)>,
    pub unique: bool,
    pub partial: Option<PartialFilter>,
}

impl IndexSpec {
    /// Plain ascending index over the given fields.
    pub fn new(name: &str, collection: &str, fields: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            collection: collection.to_string(),
            keys: fields
                .iter()
                .map(|f| ((*f).to_string(), Order::Asc))
                .collect(),
            unique: false,
            partial: None,
        }
    }

    /// Mark the index unique.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Restrict uniqueness to documents where `field` is a string.
    #[must_use]
    pub fn partial_string(mut self, field: &str) -> Self {
        self.partial = Some(PartialFilter::StringTyped(field.to_string()));
        self
    }
}

impl DocStore {
    /// Ensure a declared index exists. No-op after first application.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on invalid names or query failure. The
    /// collection's table must already exist (validators are ensured before
    /// indexes).
    pub async fn ensure_index(&self, spec: &IndexSpec) -> Result<(), StoreError> {
        check_name(&spec.name)?;
        check_name(&spec.collection)?;
        if spec.keys.is_empty() {
            return Err(StoreError::Query(format!(
                "index '{}' declares no keys",
                spec.name
            )));
        }

        let mut exprs = Vec::with_capacity(spec.keys.len());
        for (field, order) in &spec.keys {
            check_name(field)?;
            exprs.push(format!(
                "json_extract(doc, '$.{field}') {}",
                order.as_sql()
            ));
        }

        let unique = if spec.unique { "UNIQUE " } else { "" };
        let predicate = match &spec.partial {
            Some(PartialFilter::StringTyped(field)) => {
                check_name(field)?;
                format!(" WHERE json_type(doc, '$.{field}') = 'text'")
            }
            None => String::new(),
        };

        self.conn()
            .execute(
                &format!(
                    "CREATE {unique}INDEX IF NOT EXISTS \"{}\" ON \"{}\" ({}){predicate}",
                    spec.name,
                    spec.collection,
                    exprs.join(", ")
                ),
                (),
            )
            .await?;
        tracing::debug!(index = %spec.name, collection = %spec.collection, "index ensured");
        Ok(())
    }

    /// Names of indexes currently present on a collection.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the catalog query fails.
    pub async fn index_names(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT name FROM sqlite_master
                 WHERE type='index' AND tbl_name=?1 AND name NOT LIKE 'sqlite_%'
                 ORDER BY name",
                [collection],
            )
            .await?;
        let mut names = Vec::new();
        while let Some(row) = rows.next().await? {
            names.push(row.get::<String>(0)?);
        }
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CollectionSchema;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    async fn store_with_collection(name: &str) -> DocStore {
        let store = DocStore::open_local(":memory:").await.unwrap();
        store
            .ensure_validator(&CollectionSchema {
                collection: name.to_string(),
                schema: json!({"type": "object"}),
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn ensure_index_is_idempotent() {
        let store = store_with_collection("users").await;
        let spec = IndexSpec::new("users_email_unique", "users", &["email"]).unique();
        store.ensure_index(&spec).await.unwrap();
        store.ensure_index(&spec).await.unwrap();
        assert_eq!(
            store.index_names("users").await.unwrap(),
            vec!["users_email_unique".to_string()]
        );
    }

    #[tokio::test]
    async fn compound_index_created() {
        let store = store_with_collection("picks").await;
        let spec =
            IndexSpec::new("picks_pool_user_week_unique", "picks", &["poolId", "userId", "week"])
                .unique();
        store.ensure_index(&spec).await.unwrap();
        assert_eq!(
            store.index_names("picks").await.unwrap(),
            vec!["picks_pool_user_week_unique".to_string()]
        );
    }

    #[tokio::test]
    async fn index_on_missing_collection_fails() {
        let store = DocStore::open_local(":memory:").await.unwrap();
        let spec = IndexSpec::new("users_email_unique", "users", &["email"]);
        assert!(store.ensure_index(&spec).await.is_err());
    }
}

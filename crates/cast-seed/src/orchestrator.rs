//! The full bootstrap sequence.
//!
//! Phases run in dependency order: validators, then indexes, then season
//! content, then seed identities, then the fixture reset. The first fatal
//! error aborts the remainder; steps already applied are left standing,
//! which is safe because every phase is independently idempotent and the
//! sequence is designed to be rerun from the top.

use chrono::Utc;

use cast_config::SeedConfig;
use cast_store::DocStore;

use crate::error::SeedError;
use crate::fixture::{self, ResetReport};
use crate::{catalog, content, identities, reconcile};

/// Counts from one bootstrap run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub collections: usize,
    pub indexes: usize,
    pub seasons: usize,
    pub identities: usize,
    pub reset: ResetReport,
}

/// Run the whole bootstrap sequence against a store, stamped with the
/// current time.
///
/// # Errors
///
/// See [`run_at`].
pub async fn run(store: &DocStore, seed: &SeedConfig) -> Result<RunReport, SeedError> {
    run_at(store, seed, &Utc::now().to_rfc3339()).await
}

/// Run the whole bootstrap sequence with an explicit run timestamp.
///
/// Aborts before any write if the required password hash is absent. With
/// unchanged inputs (including `now`) the resulting document set is
/// identical across any number of runs.
///
/// # Errors
///
/// Returns `SeedError::Config` for missing required configuration,
/// `SeedError::Store` when the store rejects or fails an operation, and
/// `SeedError::Content` if embedded content does not parse. Completed
/// phases are not rolled back; rerunning the sequence converges.
pub async fn run_at(store: &DocStore, seed: &SeedConfig, now: &str) -> Result<RunReport, SeedError> {
    let password_hash = seed.require_password_hash()?;

    let schemas = catalog::collection_schemas();
    for schema in &schemas {
        store.ensure_validator(schema).await?;
    }
    tracing::info!(count = schemas.len(), "collection validators ensured");

    let specs = catalog::index_specs();
    for spec in &specs {
        store.ensure_index(spec).await?;
    }
    tracing::info!(count = specs.len(), "indexes ensured");

    let seasons = content::seasons()?;
    for season in &seasons {
        reconcile::converge_season(store, season, now).await?;
    }
    tracing::info!(count = seasons.len(), "seasons converged");

    let identities = identities::converge_identities(store, password_hash, now).await?;
    tracing::info!(count = identities, "seed identities converged");

    let reset = fixture::reset(store, password_hash, now).await?;

    Ok(RunReport {
        collections: schemas.len(),
        indexes: specs.len(),
        seasons: seasons.len(),
        identities,
        reset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cast_core::collections;
    use cast_store::{Document, Filter};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const NOW: &str = "2026-01-01T00:00:00+00:00";

    fn config() -> SeedConfig {
        SeedConfig {
            password_hash: "$2b$12$orchestrated".into(),
        }
    }

    async fn all_documents(store: &DocStore) -> Vec<(String, Vec<Document>)> {
        let mut all = Vec::new();
        for collection in collections::ALL {
            let docs = store.find_many(collection, &Filter::All).await.unwrap();
            all.push((collection.to_string(), docs));
        }
        all
    }

    #[tokio::test]
    async fn missing_secret_aborts_before_any_write() {
        let store = DocStore::open_local(":memory:").await.unwrap();
        let result = run(&store, &SeedConfig::default()).await;
        assert!(matches!(result, Err(SeedError::Config(_))));
        for collection in collections::ALL {
            assert!(!store.collection_exists(collection).await.unwrap());
        }
    }

    #[tokio::test]
    async fn full_run_reaches_target_state() {
        let store = DocStore::open_local(":memory:").await.unwrap();
        let report = run_at(&store, &config(), NOW).await.unwrap();

        assert_eq!(report.collections, 5);
        assert_eq!(report.seasons, 2);
        assert_eq!(report.identities, 3);
        assert!(!report.reset.previous_identity);

        assert_eq!(store.count(collections::SEASONS, None).await.unwrap(), 2);
        // test1..test3 plus the fixture identity.
        assert_eq!(store.count(collections::USERS, None).await.unwrap(), 4);
        assert_eq!(store.count(collections::POOLS, None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn rerun_leaves_document_set_unchanged() {
        let store = DocStore::open_local(":memory:").await.unwrap();
        run_at(&store, &config(), NOW).await.unwrap();
        let after_first = all_documents(&store).await;

        let report = run_at(&store, &config(), NOW).await.unwrap();
        assert!(report.reset.previous_identity);
        let after_second = all_documents(&store).await;

        // The fixture identity is recreated each run with a fresh id and
        // timestamps; everything else must be byte-identical.
        for ((name_a, docs_a), (name_b, docs_b)) in after_first.iter().zip(&after_second) {
            assert_eq!(name_a, name_b);
            assert_eq!(docs_a.len(), docs_b.len(), "{name_a} count changed");
            if name_a == collections::USERS {
                let stable = |docs: &[Document]| -> Vec<Document> {
                    docs.iter()
                        .filter(|d| d.field("username") != Some(&json!("test")))
                        .cloned()
                        .collect()
                };
                assert_eq!(stable(docs_a), stable(docs_b));
            } else {
                assert_eq!(docs_a, docs_b);
            }
        }
    }

    #[tokio::test]
    async fn rerun_after_user_activity_cleans_fixture_state() {
        let store = DocStore::open_local(":memory:").await.unwrap();
        run_at(&store, &config(), NOW).await.unwrap();

        // The fixture user creates a pool and joins it, a seed user joins too.
        let fixture = store
            .find_one(collections::USERS, &Filter::eq("username", "test"))
            .await
            .unwrap()
            .unwrap();
        let pool_body = json!({
            "name": "weekend pool",
            "ownerId": fixture.id,
            "seasonId": "ssn-00000030",
            "created_at": "2026-01-01T00:00:00+00:00",
            "current_week": 1,
            "start_week": 1,
            "status": "active",
        });
        let serde_json::Value::Object(pool_body) = pool_body else {
            unreachable!()
        };
        let pool = store
            .insert_one(collections::POOLS, pool_body)
            .await
            .unwrap();
        store
            .set_field_many(
                collections::USERS,
                &Filter::eq("username", "test1"),
                "default_pool",
                &json!(pool),
            )
            .await
            .unwrap();

        let report = run_at(&store, &config(), NOW).await.unwrap();
        assert_eq!(report.reset.pools_deleted, 1);
        assert_eq!(report.reset.backrefs_cleared, 1);
        assert_eq!(store.count(collections::POOLS, None).await.unwrap(), 0);

        let seed_user = store
            .find_one(collections::USERS, &Filter::eq("username", "test1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(seed_user.field("default_pool"), Some(&serde_json::Value::Null));
    }
}

//! Disposable fixture identity reset.
//!
//! Tears down the `test` user and everything that depends on it, then
//! recreates it with canonical credentials. The ordering is load-bearing:
//! dependents of owned pools go first, then the pools, then stale
//! back-references, and only then the identity itself. Deleting the
//! identity earlier would orphan pools or leave dangling `default_pool`
//! references for the next run to trip over.
//!
//! The whole pass is not transactional; a crash mid-cascade leaves partial
//! state that the next run converges away.

use serde_json::{Map, Value, json};

use cast_core::collections;
use cast_store::{DocStore, Filter};

use crate::error::SeedError;
use crate::identities::{FIXTURE_EMAIL, FIXTURE_USERNAME};

/// What a reset pass removed and recreated.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResetReport {
    /// Whether a previous fixture identity existed and was torn down.
    pub previous_identity: bool,
    pub pools_deleted: u64,
    pub memberships_deleted: u64,
    pub picks_deleted: u64,
    pub backrefs_cleared: u64,
}

/// Reset the fixture identity: cascade-delete its state, then recreate it.
///
/// An absent fixture identity is the bootstrap case, not an error: teardown
/// is skipped and the identity is created fresh. A `picks` collection that
/// was never created is feature-detected and skipped.
///
/// # Errors
///
/// Returns `SeedError::Store` if any store operation fails; the pass stops
/// at the failing step.
pub async fn reset(
    store: &DocStore,
    password_hash: &str,
    now: &str,
) -> Result<ResetReport, SeedError> {
    let mut report = ResetReport::default();

    if let Some(existing) = store
        .find_one(collections::USERS, &Filter::eq("username", FIXTURE_USERNAME))
        .await?
    {
        report.previous_identity = true;
        let user_id = existing.id;

        let owned: Vec<Value> = store
            .find_ids(collections::POOLS, &Filter::eq("ownerId", user_id.clone()))
            .await?
            .into_iter()
            .map(Value::String)
            .collect();

        if !owned.is_empty() {
            report.memberships_deleted += store
                .delete_many(
                    collections::POOL_MEMBERSHIPS,
                    &Filter::any_of("poolId", owned.clone()),
                )
                .await?;
            report.pools_deleted = store
                .delete_many(collections::POOLS, &Filter::any_of("_id", owned.clone()))
                .await?;
            report.backrefs_cleared = store
                .set_field_many(
                    collections::USERS,
                    &Filter::any_of("default_pool", owned.clone()),
                    "default_pool",
                    &Value::Null,
                )
                .await?;
        }

        // The fixture user may belong to pools it does not own.
        report.memberships_deleted += store
            .delete_many(
                collections::POOL_MEMBERSHIPS,
                &Filter::eq("userId", user_id.clone()),
            )
            .await?;

        if store.collection_exists(collections::PICKS).await? {
            let mut branches = vec![Filter::eq("userId", user_id.clone())];
            if !owned.is_empty() {
                branches.push(Filter::any_of("poolId", owned));
            }
            report.picks_deleted = store
                .delete_many(collections::PICKS, &Filter::Or(branches))
                .await?;
        }

        store
            .delete_one(collections::USERS, &Filter::id(user_id))
            .await?;
        tracing::info!(
            pools = report.pools_deleted,
            memberships = report.memberships_deleted,
            picks = report.picks_deleted,
            backrefs = report.backrefs_cleared,
            "fixture identity torn down"
        );
    } else {
        tracing::info!("no fixture identity present, skipping teardown");
    }

    store
        .insert_one(collections::USERS, fixture_document(password_hash, now))
        .await?;
    tracing::info!(username = FIXTURE_USERNAME, "fixture identity recreated");
    Ok(report)
}

/// Canonical state of a freshly reset fixture identity.
fn fixture_document(password_hash: &str, now: &str) -> Map<String, Value> {
    let Value::Object(doc) = json!({
        "username": FIXTURE_USERNAME,
        "email": FIXTURE_EMAIL,
        "password_hash": password_hash,
        "account_status": "active",
        "created_at": now,
        "default_pool": null,
        "token_invalidated_at": now,
        "email_verified": true,
        "verification_token": null,
        "verification_verified_at": now,
        "verification_sent_at": now,
    }) else {
        unreachable!("literal object")
    };
    doc
}

//! Declared identity fixtures.
//!
//! Three non-disposable identities are converged on every run: their account
//! state is forced back to a known-good, verified shape, while their
//! assigned id and creation bookkeeping are written only once. The
//! disposable identity (`test`) is owned by the fixture reset instead and
//! never converged here.

use serde_json::{Map, Value, json};

use cast_core::collections;
use cast_store::{DocStore, Filter};

use crate::error::SeedError;
use crate::reconcile::converge;

/// A non-disposable seed identity: natural key, contact address, assigned id.
#[derive(Debug, Clone, Copy)]
pub struct SeedIdentity {
    pub username: &'static str,
    pub email: &'static str,
    pub id: &'static str,
}

/// The fixed seed accounts, always present after a run.
pub const SEED_IDENTITIES: [SeedIdentity; 3] = [
    SeedIdentity {
        username: "test1",
        email: "test1@email.com",
        id: "usr-ad79e575",
    },
    SeedIdentity {
        username: "test2",
        email: "test2@email.com",
        id: "usr-ad79e576",
    },
    SeedIdentity {
        username: "test3",
        email: "test3@email.com",
        id: "usr-ad79e577",
    },
];

/// Natural key of the disposable end-to-end fixture identity.
pub const FIXTURE_USERNAME: &str = "test";
/// Contact address the fixture identity is recreated with.
pub const FIXTURE_EMAIL: &str = "test@email.com";

/// Converge every declared seed identity. Returns the number converged.
///
/// # Errors
///
/// Returns `SeedError::Store` if a write is rejected or fails.
pub async fn converge_identities(
    store: &DocStore,
    password_hash: &str,
    now: &str,
) -> Result<usize, SeedError> {
    for account in &SEED_IDENTITIES {
        let convergent = to_map(json!({
            "email": account.email,
            "password_hash": password_hash,
            "account_status": "active",
            "email_verified": true,
            "verification_token": null,
            "verification_verified_at": now,
        }));
        let provenance = to_map(json!({
            "_id": account.id,
            "created_at": now,
            "default_pool": null,
            "verification_sent_at": now,
        }));
        converge(
            store,
            collections::USERS,
            &Filter::eq("username", account.username),
            convergent,
            provenance,
        )
        .await?;
    }
    Ok(SEED_IDENTITIES.len())
}

fn to_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

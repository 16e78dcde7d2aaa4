//! The convergence primitive: bring one document to its declared state.
//!
//! Every seed write goes through [`converge`]: look up by natural key,
//! overwrite exactly the convergent fields if found, otherwise create the
//! document from natural key + convergent + provenance fields. Provenance
//! (creation timestamp, assigned id) is written once and never touched
//! again.
//!
//! A call covers a single natural key and is not transactional across keys;
//! callers sequence multi-document invariants themselves (see the fixture
//! reset).

use serde_json::{Map, Value};

use cast_core::collections;
use cast_core::entities::Season;
use cast_store::{DocStore, Filter, UpsertOutcome};

use crate::error::SeedError;

/// Converge the document identified by `natural_key` to the given state.
///
/// Repeated invocation with identical inputs is a no-op after the first;
/// changed convergent values always take effect on rerun; provenance fields
/// are immutable once set.
///
/// # Errors
///
/// Returns `SeedError::Store` if the write is rejected (schema violation,
/// duplicate key) or fails.
pub async fn converge(
    store: &DocStore,
    collection: &str,
    natural_key: &Filter,
    convergent: Map<String, Value>,
    provenance: Map<String, Value>,
) -> Result<UpsertOutcome, SeedError> {
    let outcome = store
        .upsert(collection, natural_key, &convergent, &provenance)
        .await?;
    tracing::debug!(
        collection,
        id = %outcome.id,
        created = outcome.created,
        "converged document"
    );
    Ok(outcome)
}

/// Converge one season document keyed by its season number.
///
/// All season content is convergent; `created_at` is the only provenance
/// field.
///
/// # Errors
///
/// Returns `SeedError::Store` on rejection or store failure.
pub async fn converge_season(
    store: &DocStore,
    season: &Season,
    now: &str,
) -> Result<UpsertOutcome, SeedError> {
    let Value::Object(mut convergent) = serde_json::to_value(season)
        .map_err(|e| SeedError::Content(e.to_string()))?
    else {
        return Err(SeedError::Content("season did not serialize to an object".into()));
    };
    // The natural key comes from the filter, not the field map.
    convergent.remove("season_number");

    let mut provenance = Map::new();
    provenance.insert("created_at".to_string(), Value::String(now.to_string()));

    converge(
        store,
        collections::SEASONS,
        &Filter::eq("season_number", season.season_number),
        convergent,
        provenance,
    )
    .await
}

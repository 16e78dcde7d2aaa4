//! Declared collection schemas and index set.
//!
//! The per-collection contracts are modeled as data and fed through the
//! store's generic ensure routines, so convergence logic stays uniform and
//! testable apart from content. Timestamps are RFC 3339 strings throughout.
//!
//! One canonical schema per collection. For `seasons.advantages` the
//! required set is the one every shipped dataset satisfies: the season 48
//! data predates status tracking, so `status` and the play/transfer fields
//! are optional.

use serde_json::json;

use cast_core::collections;
use cast_store::{CollectionSchema, IndexSpec};

/// Every declared collection schema, in ensure order.
#[must_use]
pub fn collection_schemas() -> Vec<CollectionSchema> {
    vec![
        users_schema(),
        pools_schema(),
        pool_memberships_schema(),
        picks_schema(),
        seasons_schema(),
    ]
}

/// Every declared index, in ensure order.
///
/// Index names are part of the durable contract; renaming one is a breaking
/// change that needs an explicit migration.
#[must_use]
pub fn index_specs() -> Vec<IndexSpec> {
    vec![
        IndexSpec::new("users_email_unique", collections::USERS, &["email"]).unique(),
        IndexSpec::new("users_username_unique", collections::USERS, &["username"]).unique(),
        IndexSpec::new("users_default_pool_idx", collections::USERS, &["default_pool"]),
        IndexSpec::new(
            "users_verification_token_unique",
            collections::USERS,
            &["verification_token"],
        )
        .unique()
        .partial_string("verification_token"),
        IndexSpec::new("users_reset_token_unique", collections::USERS, &["reset_token"])
            .unique()
            .partial_string("reset_token"),
        IndexSpec::new(
            "seasons_season_number_unique",
            collections::SEASONS,
            &["season_number"],
        )
        .unique(),
        IndexSpec::new("seasons_season_name_idx", collections::SEASONS, &["season_name"]),
        IndexSpec::new("pools_owner_idx", collections::POOLS, &["ownerId"]),
        IndexSpec::new("pools_season_idx", collections::POOLS, &["seasonId"]),
        IndexSpec::new(
            "pool_memberships_pool_user_unique",
            collections::POOL_MEMBERSHIPS,
            &["poolId", "userId"],
        )
        .unique(),
        IndexSpec::new(
            "pool_memberships_user_idx",
            collections::POOL_MEMBERSHIPS,
            &["userId"],
        ),
        IndexSpec::new(
            "pool_memberships_pool_idx",
            collections::POOL_MEMBERSHIPS,
            &["poolId"],
        ),
        IndexSpec::new(
            "pool_memberships_pool_status_idx",
            collections::POOL_MEMBERSHIPS,
            &["poolId", "status"],
        ),
        IndexSpec::new(
            "picks_pool_user_week_unique",
            collections::PICKS,
            &["poolId", "userId", "week"],
        )
        .unique(),
        IndexSpec::new("picks_pool_week_idx", collections::PICKS, &["poolId", "week"]),
        IndexSpec::new("picks_user_pool_idx", collections::PICKS, &["userId", "poolId"]),
        IndexSpec::new(
            "picks_pool_contestant_idx",
            collections::PICKS,
            &["poolId", "contestant_id"],
        ),
        IndexSpec::new("picks_result_idx", collections::PICKS, &["result"]),
    ]
}

fn users_schema() -> CollectionSchema {
    CollectionSchema {
        collection: collections::USERS.to_string(),
        schema: json!({
            "type": "object",
            "required": [
                "username", "email", "password_hash", "account_status",
                "email_verified", "created_at"
            ],
            "properties": {
                "username": {"type": "string"},
                "email": {"type": "string"},
                "password_hash": {"type": "string"},
                "account_status": {"type": "string"},
                "email_verified": {"type": "boolean"},
                "created_at": {"type": "string"},
                "default_pool": {"type": ["string", "null"]},
                "verification_token": {"type": ["string", "null"]},
                "verification_sent_at": {"type": ["string", "null"]},
                "verification_verified_at": {"type": ["string", "null"]},
                "token_invalidated_at": {"type": ["string", "null"]},
                "failed_login_attempts": {"type": "integer"},
                "locked_until": {"type": ["string", "null"]},
                "reset_token": {"type": ["string", "null"]},
                "reset_token_expires_at": {"type": ["string", "null"]}
            }
        }),
    }
}

fn pools_schema() -> CollectionSchema {
    CollectionSchema {
        collection: collections::POOLS.to_string(),
        schema: json!({
            "type": "object",
            "required": [
                "name", "ownerId", "seasonId", "created_at",
                "current_week", "start_week", "status"
            ],
            "properties": {
                "name": {"type": "string"},
                "ownerId": {"type": "string"},
                "seasonId": {"type": "string"},
                "created_at": {"type": "string"},
                "current_week": {"type": "integer"},
                "start_week": {"type": "integer"},
                "settings": {"type": "object"},
                "status": {"type": "string"},
                "is_competitive": {"type": "boolean"},
                "competitive_since_week": {"type": ["integer", "null"]},
                "completed_week": {"type": ["integer", "null"]},
                "completed_at": {"type": ["string", "null"]},
                "winners": {"type": "array", "items": {"type": "string"}}
            }
        }),
    }
}

fn pool_memberships_schema() -> CollectionSchema {
    CollectionSchema {
        collection: collections::POOL_MEMBERSHIPS.to_string(),
        schema: json!({
            "type": "object",
            "required": ["poolId", "userId", "role", "status", "score"],
            "properties": {
                "poolId": {"type": "string"},
                "userId": {"type": "string"},
                "role": {"type": "string"},
                "status": {"type": "string"},
                "joinedAt": {"type": ["string", "null"]},
                "invitedAt": {"type": ["string", "null"]},
                "elimination_reason": {"type": ["string", "null"]},
                "eliminated_week": {"type": ["integer", "null"]},
                "eliminated_date": {"type": ["string", "null"]},
                "available_contestants": {"type": "array", "items": {"type": "string"}},
                "score": {"type": "integer"},
                "final_rank": {"type": ["integer", "null"]},
                "finished_week": {"type": ["integer", "null"]},
                "finished_date": {"type": ["string", "null"]}
            }
        }),
    }
}

fn picks_schema() -> CollectionSchema {
    CollectionSchema {
        collection: collections::PICKS.to_string(),
        schema: json!({
            "type": "object",
            "required": ["poolId", "userId", "contestant_id", "week", "result", "created_at"],
            "properties": {
                "poolId": {"type": "string"},
                "userId": {"type": "string"},
                "contestant_id": {"type": "string"},
                "week": {"type": "integer"},
                "created_at": {"type": "string"},
                "result": {"type": "string"},
                "result_date": {"type": ["string", "null"]}
            }
        }),
    }
}

fn seasons_schema() -> CollectionSchema {
    CollectionSchema {
        collection: collections::SEASONS.to_string(),
        schema: json!({
            "type": "object",
            "required": [
                "season_name", "season_number", "air_date", "location",
                "format", "contestants", "eliminations", "tribe_timeline"
            ],
            "properties": {
                "season_name": {"type": "string"},
                "season_number": {"type": "number"},
                "air_date": {"type": "string"},
                "location": {"type": "string"},
                "format": {"type": "string"},
                "created_at": {"type": "string"},
                "contestants": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["id", "name"],
                        "properties": {
                            "id": {"type": "string"},
                            "name": {"type": "string"},
                            "age": {"type": ["number", "null"]},
                            "occupation": {"type": ["string", "null"]},
                            "hometown": {"type": ["string", "null"]}
                        }
                    }
                },
                "eliminations": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["week"],
                        "properties": {
                            "week": {"type": "number"},
                            "eliminated_contestant_id": {"type": ["string", "null"]}
                        }
                    }
                },
                "tribe_timeline": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["week", "tribes"],
                        "properties": {
                            "week": {"type": "number"},
                            "event": {"type": ["string", "null"]},
                            "notes": {"type": ["string", "null"]},
                            "tribes": {
                                "type": "array",
                                "items": {
                                    "type": "object",
                                    "required": ["name", "members"],
                                    "properties": {
                                        "name": {"type": "string"},
                                        "color": {"type": ["string", "null"]},
                                        "members": {"type": "array", "items": {"type": "string"}}
                                    }
                                }
                            }
                        }
                    }
                },
                "advantages": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["id", "advantage_type", "contestant_id", "obtained_week"],
                        "properties": {
                            "id": {"type": "string"},
                            "advantage_type": {"type": "string"},
                            "advantage_display_name": {"type": ["string", "null"]},
                            "contestant_id": {"type": "string"},
                            "obtained_week": {"type": "number"},
                            "status": {"type": ["string", "null"]},
                            "played_week": {"type": ["number", "null"]},
                            "transferred_to": {"type": ["string", "null"]},
                            "notes": {"type": ["string", "null"]},
                            "acquisition_notes": {"type": ["string", "null"]}
                        }
                    }
                }
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    #[test]
    fn one_schema_per_declared_collection() {
        let schemas = collection_schemas();
        let names: Vec<&str> = schemas.iter().map(|s| s.collection.as_str()).collect();
        assert_eq!(names, collections::ALL);
    }

    #[rstest]
    #[case(collections::USERS)]
    #[case(collections::POOLS)]
    #[case(collections::POOL_MEMBERSHIPS)]
    #[case(collections::PICKS)]
    #[case(collections::SEASONS)]
    fn declared_schema_compiles(#[case] collection: &str) {
        let schema = collection_schemas()
            .into_iter()
            .find(|s| s.collection == collection)
            .expect("declared");
        jsonschema::validator_for(&schema.schema).expect("schema should compile");
    }

    #[test]
    fn index_names_are_unique() {
        let specs = index_specs();
        let names: HashSet<&str> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names.len(), specs.len());
    }

    #[test]
    fn indexes_only_reference_declared_collections() {
        for spec in index_specs() {
            assert!(
                collections::ALL.contains(&spec.collection.as_str()),
                "index '{}' references undeclared collection '{}'",
                spec.name,
                spec.collection
            );
        }
    }

    #[test]
    fn token_indexes_are_partial_unique() {
        for name in ["users_verification_token_unique", "users_reset_token_unique"] {
            let spec = index_specs().into_iter().find(|s| s.name == name).unwrap();
            assert!(spec.unique, "{name} must be unique");
            assert!(spec.partial.is_some(), "{name} must be partial");
        }
    }
}

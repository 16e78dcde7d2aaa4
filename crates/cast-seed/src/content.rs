//! Static season content.
//!
//! The season datasets are embedded at compile time and returned as a
//! finite, ordered list: the content interface the reconciler consumes.
//! Each document fully specifies one season; contestant ids are
//! pre-slugged and referenced by eliminations, tribe rosters, and
//! advantages.

use cast_core::entities::Season;

use crate::error::SeedError;

const SEASON_48: &str = include_str!("content/season48.json");
const SEASON_49: &str = include_str!("content/season49.json");

/// All seed seasons, ordered by season number.
///
/// # Errors
///
/// Returns `SeedError::Content` if an embedded document does not parse;
/// that is a packaging defect, not a runtime condition.
pub fn seasons() -> Result<Vec<Season>, SeedError> {
    [SEASON_48, SEASON_49]
        .into_iter()
        .map(|raw| {
            serde_json::from_str::<Season>(raw).map_err(|e| SeedError::Content(e.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn both_seasons_parse_in_order() {
        let seasons = seasons().unwrap();
        let numbers: Vec<i64> = seasons.iter().map(|s| s.season_number).collect();
        assert_eq!(numbers, vec![48, 49]);
    }

    #[test]
    fn contestant_ids_are_unique_per_season() {
        for season in seasons().unwrap() {
            let ids: HashSet<&str> = season.contestants.iter().map(|c| c.id.as_str()).collect();
            assert_eq!(
                ids.len(),
                season.contestants.len(),
                "duplicate contestant id in season {}",
                season.season_number
            );
        }
    }

    #[test]
    fn references_resolve_to_contestants() {
        for season in seasons().unwrap() {
            let ids: HashSet<&str> = season.contestants.iter().map(|c| c.id.as_str()).collect();
            for elim in &season.eliminations {
                if let Some(out) = &elim.eliminated_contestant_id {
                    assert!(ids.contains(out.as_str()), "unknown eliminee {out}");
                }
            }
            for week in &season.tribe_timeline {
                for tribe in &week.tribes {
                    for member in &tribe.members {
                        assert!(ids.contains(member.as_str()), "unknown member {member}");
                    }
                }
            }
            for adv in &season.advantages {
                assert!(
                    ids.contains(adv.contestant_id.as_str()),
                    "unknown advantage holder {}",
                    adv.contestant_id
                );
            }
        }
    }

    #[test]
    fn season_documents_satisfy_declared_schema() {
        let schema = crate::catalog::collection_schemas()
            .into_iter()
            .find(|s| s.collection == cast_core::collections::SEASONS)
            .unwrap();
        let validator = jsonschema::validator_for(&schema.schema).unwrap();
        for season in seasons().unwrap() {
            let doc = serde_json::to_value(&season).unwrap();
            let errors: Vec<String> = validator.iter_errors(&doc).map(|e| e.to_string()).collect();
            assert!(
                errors.is_empty(),
                "season {} fails schema: {errors:?}",
                season.season_number
            );
        }
    }
}

use serde::{Deserialize, Serialize};

/// One competition season: the full static dataset converged into the
/// `seasons` collection on every bootstrap run.
///
/// `season_number` is the natural key; everything else is convergent
/// content. The store-assigned id and `created_at` are provenance and live
/// outside this struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub season_name: String,
    pub season_number: i64,
    /// Premiere date, RFC 3339.
    pub air_date: String,
    pub location: String,
    pub format: String,
    pub contestants: Vec<Contestant>,
    pub eliminations: Vec<Elimination>,
    pub tribe_timeline: Vec<TribeWeek>,
    pub advantages: Vec<Advantage>,
}

/// A contestant roster entry. `id` is the slugged name, stable across runs
/// and referenced by eliminations, tribe membership lists, and advantages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contestant {
    pub id: String,
    pub name: String,
    pub age: Option<u32>,
    pub occupation: Option<String>,
    pub hometown: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Elimination {
    pub week: u32,
    pub eliminated_contestant_id: Option<String>,
}

/// Tribe composition as of a given week (start, swap, or merge).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TribeWeek {
    pub week: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub tribes: Vec<Tribe>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tribe {
    pub name: String,
    pub color: Option<String>,
    pub members: Vec<String>,
}

/// An in-game advantage held by a contestant.
///
/// The season 48 dataset predates status tracking, so `status` and the
/// play/transfer fields are optional; season 49 sets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advantage {
    pub id: String,
    pub advantage_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advantage_display_name: Option<String>,
    pub contestant_id: String,
    pub obtained_week: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub played_week: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transferred_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquisition_notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn season_roundtrips_through_json() {
        let season = Season {
            season_name: "Survivor 1".into(),
            season_number: 1,
            air_date: "2000-05-31T00:00:00Z".into(),
            location: "Borneo".into(),
            format: "classic".into(),
            contestants: vec![Contestant {
                id: "richard_hatch".into(),
                name: "Richard Hatch".into(),
                age: Some(38),
                occupation: Some("Corporate Trainer".into()),
                hometown: Some("Newport, RI".into()),
            }],
            eliminations: vec![Elimination {
                week: 1,
                eliminated_contestant_id: None,
            }],
            tribe_timeline: vec![TribeWeek {
                week: 1,
                event: Some("start".into()),
                notes: None,
                tribes: vec![Tribe {
                    name: "Tagi".into(),
                    color: Some("orange".into()),
                    members: vec!["richard_hatch".into()],
                }],
            }],
            advantages: vec![],
        };

        let json = serde_json::to_value(&season).unwrap();
        let back: Season = serde_json::from_value(json).unwrap();
        assert_eq!(season, back);
    }

    #[test]
    fn advantage_without_status_fields_parses() {
        let json = serde_json::json!({
            "id": "idol_x_1",
            "advantage_type": "hidden_immunity_idol",
            "contestant_id": "x",
            "obtained_week": 2
        });
        let adv: Advantage = serde_json::from_value(json.clone()).unwrap();
        assert!(adv.status.is_none());
        // Absent optional fields stay absent on re-serialization.
        assert_eq!(serde_json::to_value(&adv).unwrap(), json);
    }
}

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::model::{Environment, Power, Resources, SocioEconomic, Trait};

/// Proposed mutations for one faction within a tick.
///
/// Scalar fields are whole-value replacements (`None` = untouched); the
/// set fields accumulate. Within a tick the last subsystem to write a
/// scalar wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FactionDelta {
    pub power: Option<Power>,
    pub legitimacy: Option<f64>,
    pub resources: Option<Resources>,
    pub knowledge: Option<f64>,
    #[serde(default)]
    pub add_regions: BTreeSet<String>,
    #[serde(default)]
    pub remove_regions: BTreeSet<String>,
    #[serde(default)]
    pub add_alliances: BTreeSet<String>,
    #[serde(default)]
    pub remove_alliances: BTreeSet<String>,
    #[serde(default)]
    pub deactivate: bool,
}

/// Proposed mutations for one region within a tick.
///
/// `stability` is a shortcut that overrides only the cohesion half of
/// `socio_economic` and is applied after it. `owner` of `Some("")` clears
/// ownership.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RegionDelta {
    pub socio_economic: Option<SocioEconomic>,
    pub stability: Option<f64>,
    pub population: Option<i64>,
    pub owner: Option<String>,
}

/// Everything needed to bring a new faction into the world mid-simulation
/// (insurrections, civil-war splinters).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FactionCreation {
    pub id: String,
    pub name: String,
    pub power: Power,
    pub legitimacy: f64,
    pub resources: Resources,
    #[serde(default)]
    pub knowledge: f64,
    #[serde(default)]
    pub regions: BTreeSet<String>,
    #[serde(default)]
    pub alliances: BTreeSet<String>,
    #[serde(default)]
    pub traits: BTreeSet<Trait>,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    "#808080".to_string()
}

/// Region creation record, used only by world initialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegionCreation {
    pub id: String,
    pub name: String,
    pub population: i64,
    pub environment: Environment,
    pub socio_economic: SocioEconomic,
    pub owner: Option<String>,
}

/// The full mutation record for one tick: per-entity deltas, lifecycle
/// records and the narrative event log. Serialized verbatim into the
/// delta journal, so every collection is ordered.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorldDelta {
    #[serde(default)]
    pub faction_deltas: BTreeMap<String, FactionDelta>,
    #[serde(default)]
    pub region_deltas: BTreeMap<String, RegionDelta>,
    #[serde(default)]
    pub create_factions: BTreeMap<String, FactionCreation>,
    #[serde(default)]
    pub create_regions: BTreeMap<String, RegionCreation>,
    #[serde(default)]
    pub delete_factions: BTreeSet<String>,
    #[serde(default)]
    pub delete_regions: BTreeSet<String>,
    #[serde(default)]
    pub events: Vec<String>,
}

impl WorldDelta {
    pub fn is_empty(&self) -> bool {
        self.faction_deltas.is_empty()
            && self.region_deltas.is_empty()
            && self.create_factions.is_empty()
            && self.create_regions.is_empty()
            && self.delete_factions.is_empty()
            && self.delete_regions.is_empty()
            && self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_round_trip() {
        let mut delta = WorldDelta::default();
        delta.faction_deltas.insert(
            "f1".to_string(),
            FactionDelta {
                legitimacy: Some(42.0),
                deactivate: true,
                ..FactionDelta::default()
            },
        );
        delta.region_deltas.insert(
            "r1".to_string(),
            RegionDelta {
                owner: Some(String::new()),
                ..RegionDelta::default()
            },
        );
        delta.events.push("test event".to_string());

        let json = serde_json::to_string(&delta).unwrap();
        let parsed: WorldDelta = serde_json::from_str(&json).unwrap();
        assert_eq!(delta, parsed);
    }

    #[test]
    fn map_keys_serialize_sorted() {
        let mut delta = WorldDelta::default();
        for id in ["f_z", "f_a", "f_m"] {
            delta
                .faction_deltas
                .insert(id.to_string(), FactionDelta::default());
        }
        let json = serde_json::to_string(&delta).unwrap();
        let a = json.find("f_a").unwrap();
        let m = json.find("f_m").unwrap();
        let z = json.find("f_z").unwrap();
        assert!(a < m && m < z);
    }

    #[test]
    fn empty_delta_is_empty() {
        assert!(WorldDelta::default().is_empty());
    }
}

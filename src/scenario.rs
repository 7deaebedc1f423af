//! Scenario import/export: the stable JSON schema used both for user
//! uploads and for persisted world snapshots.
//!
//! Import is tolerant: missing fields take defaults, `power` and
//! `resources` accept a bare number (expanded into army / credits),
//! unknown environments fall back to RURAL and unknown traits are
//! dropped. Export always writes the full form.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::model::{
    Environment, Faction, Power, Region, Resources, SocioEconomic, Trait, World,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldDoc {
    #[serde(default)]
    pub factions: Vec<FactionDoc>,
    #[serde(default)]
    pub regions: Vec<RegionDoc>,
}

/// `power` / `resources` in a document: either the full block or a single
/// number that expands into the primary field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PowerField {
    Full(Power),
    Scalar(f64),
}

impl Default for PowerField {
    fn default() -> Self {
        PowerField::Full(Power::default())
    }
}

impl PowerField {
    fn into_power(self) -> Power {
        match self {
            PowerField::Full(p) => p,
            PowerField::Scalar(v) => Power {
                army: v,
                ..Power::default()
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourcesField {
    Full(Resources),
    Scalar(f64),
}

impl Default for ResourcesField {
    fn default() -> Self {
        ResourcesField::Full(Resources::default())
    }
}

impl ResourcesField {
    fn into_resources(self) -> Resources {
        match self {
            ResourcesField::Full(r) => r,
            ResourcesField::Scalar(v) => Resources {
                credits: v,
                ..Resources::default()
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactionDoc {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub power: PowerField,
    #[serde(default = "default_legitimacy")]
    pub legitimacy: f64,
    #[serde(default)]
    pub resources: ResourcesField,
    #[serde(default)]
    pub knowledge: f64,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub alliances: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default = "default_color")]
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionDoc {
    pub id: String,
    pub name: String,
    #[serde(default = "default_population")]
    pub population: i64,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default, deserialize_with = "lenient_environment")]
    pub environment: Environment,
    #[serde(default)]
    pub socio_economic: Option<SocioEconomic>,
    /// Legacy documents carry a bare stability instead of the
    /// socio-economic block; accepted on import, never exported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stability: Option<f64>,
}

fn default_legitimacy() -> f64 {
    50.0
}

fn default_true() -> bool {
    true
}

fn default_color() -> String {
    "#808080".to_string()
}

fn default_population() -> i64 {
    1000
}

fn lenient_environment<'de, D: Deserializer<'de>>(de: D) -> Result<Environment, D::Error> {
    let name = String::deserialize(de)?;
    Ok(Environment::from_name(&name))
}

/// Build a [`World`] from a document, reconciling ownership so the result
/// always satisfies the global invariants: `region.owner` wins over
/// faction region lists, unknown references are dropped, and alliances
/// are made symmetric and irreflexive.
pub fn world_from_doc(doc: WorldDoc) -> World {
    let mut world = World::new();
    let mut claimed: Vec<(String, Vec<String>)> = Vec::new();

    for fdoc in doc.factions {
        let traits: BTreeSet<Trait> = fdoc
            .traits
            .iter()
            .filter_map(|t| Trait::from_name(t))
            .collect();
        let alliances: BTreeSet<String> = fdoc
            .alliances
            .into_iter()
            .filter(|a| a != &fdoc.id)
            .collect();
        claimed.push((fdoc.id.clone(), fdoc.regions));
        let faction = Faction {
            id: fdoc.id.clone(),
            name: fdoc.name,
            power: fdoc.power.into_power(),
            legitimacy: fdoc.legitimacy,
            resources: fdoc.resources.into_resources(),
            knowledge: fdoc.knowledge,
            regions: BTreeSet::new(),
            alliances,
            traits,
            is_active: fdoc.is_active,
            color: fdoc.color,
        };
        world.factions.insert(fdoc.id, faction);
    }

    let mut owners: Vec<(String, String)> = Vec::new();
    for rdoc in doc.regions {
        let socio_economic = match (rdoc.socio_economic, rdoc.stability) {
            (Some(se), _) => se,
            (None, Some(stability)) => SocioEconomic {
                cohesion: stability,
                ..SocioEconomic::default()
            },
            (None, None) => SocioEconomic::default(),
        };
        if let Some(owner) = rdoc.owner.filter(|o| !o.is_empty()) {
            owners.push((rdoc.id.clone(), owner));
        }
        let region = Region {
            id: rdoc.id.clone(),
            name: rdoc.name,
            population: rdoc.population.max(0),
            owner: None,
            environment: rdoc.environment,
            socio_economic,
        };
        world.regions.insert(rdoc.id, region);
    }

    // Faction region lists first, then explicit region owners on top.
    for (faction_id, region_ids) in claimed {
        for region_id in region_ids {
            let free = world
                .get_region(&region_id)
                .is_some_and(|r| r.owner.is_none());
            if free && world.factions.contains_key(&faction_id) {
                world.set_region_owner(&region_id, Some(&faction_id));
            }
        }
    }
    for (region_id, owner) in owners {
        if world.factions.contains_key(&owner) {
            world.set_region_owner(&region_id, Some(&owner));
        }
    }

    // Drop alliances to unknown factions, then mirror one-sided edges.
    let known: BTreeSet<String> = world.factions.keys().cloned().collect();
    for faction in world.factions.values_mut() {
        faction.alliances.retain(|a| known.contains(a));
    }
    let edges: Vec<(String, String)> = world
        .factions
        .iter()
        .flat_map(|(id, f)| f.alliances.iter().map(move |a| (id.clone(), a.clone())))
        .collect();
    for (a, b) in edges {
        if let Some(ally) = world.factions.get_mut(&b) {
            ally.alliances.insert(a);
        }
    }

    world
}

pub fn world_to_doc(world: &World) -> WorldDoc {
    WorldDoc {
        factions: world
            .factions
            .values()
            .map(|f| FactionDoc {
                id: f.id.clone(),
                name: f.name.clone(),
                power: PowerField::Full(f.power),
                legitimacy: f.legitimacy,
                resources: ResourcesField::Full(f.resources),
                knowledge: f.knowledge,
                traits: f.traits.iter().map(|t| t.name().to_string()).collect(),
                regions: f.regions.iter().cloned().collect(),
                alliances: f.alliances.iter().cloned().collect(),
                is_active: f.is_active,
                color: f.color.clone(),
            })
            .collect(),
        regions: world
            .regions
            .values()
            .map(|r| RegionDoc {
                id: r.id.clone(),
                name: r.name.clone(),
                population: r.population,
                owner: r.owner.clone(),
                environment: r.environment,
                socio_economic: Some(r.socio_economic),
                stability: None,
            })
            .collect(),
    }
}

pub fn world_from_json(json: &str) -> Result<World, serde_json::Error> {
    Ok(world_from_doc(serde_json::from_str(json)?))
}

pub fn world_to_json(world: &World) -> Result<String, serde_json::Error> {
    serde_json::to_string(&world_to_doc(world))
}

/// The three-power starter scenario: a militarist hegemon, a prosperous
/// republic and a technocratic syndicate, plus two unclaimed frontiers.
pub fn demo_world() -> World {
    let mut doc = WorldDoc::default();

    doc.factions.push(FactionDoc {
        id: "f_hegemony".to_string(),
        name: "Solar Hegemony".to_string(),
        power: PowerField::Full(Power::new(60.0, 30.0, 20.0)),
        legitimacy: 45.0,
        resources: ResourcesField::Full(Resources {
            credits: 40.0,
            materials: 150.0,
            ..Resources::default()
        }),
        knowledge: 0.0,
        traits: vec!["Militarist".to_string(), "Industrialist".to_string()],
        regions: vec!["r_capital".to_string(), "r_foundries".to_string()],
        alliances: vec![],
        is_active: true,
        color: "#E74C3C".to_string(),
    });
    doc.factions.push(FactionDoc {
        id: "f_republic".to_string(),
        name: "United Republic".to_string(),
        power: PowerField::Full(Power::new(25.0, 35.0, 30.0)),
        legitimacy: 85.0,
        resources: ResourcesField::Full(Resources {
            credits: 200.0,
            materials: 40.0,
            ..Resources::default()
        }),
        knowledge: 0.0,
        traits: vec!["Diplomat".to_string(), "Pacifist".to_string()],
        regions: vec!["r_liberty".to_string(), "r_breadbasket".to_string()],
        alliances: vec![],
        is_active: true,
        color: "#3498DB".to_string(),
    });
    doc.factions.push(FactionDoc {
        id: "f_syndicate".to_string(),
        name: "Iron Syndicate".to_string(),
        power: PowerField::Full(Power::new(30.0, 15.0, 45.0)),
        legitimacy: 60.0,
        resources: ResourcesField::Full(Resources {
            credits: 80.0,
            materials: 90.0,
            ..Resources::default()
        }),
        knowledge: 0.0,
        traits: vec!["Technocrat".to_string(), "Militarist".to_string()],
        regions: vec!["r_citadel".to_string(), "r_outreach".to_string()],
        alliances: vec![],
        is_active: true,
        color: "#F1C40F".to_string(),
    });

    let mut region = |id: &str, name: &str, pop: i64, owner: Option<&str>, env: &str, infra: f64, cohesion: f64| {
        doc.regions.push(RegionDoc {
            id: id.to_string(),
            name: name.to_string(),
            population: pop,
            owner: owner.map(String::from),
            environment: Environment::from_name(env),
            socio_economic: Some(SocioEconomic {
                infrastructure: infra,
                cohesion,
            }),
            stability: None,
        });
    };

    region("r_capital", "Hegemon City", 8000, Some("f_hegemony"), "URBAN", 85.0, 90.0);
    region("r_foundries", "Iron Foundries", 1500, Some("f_hegemony"), "INDUSTRIAL", 60.0, 40.0);
    region("r_liberty", "Liberty Port", 3000, Some("f_republic"), "COASTAL", 70.0, 95.0);
    region("r_breadbasket", "Verdant Valleys", 2000, Some("f_republic"), "RURAL", 40.0, 100.0);
    region("r_citadel", "Syndicate Citadel", 1200, Some("f_syndicate"), "INDUSTRIAL", 90.0, 70.0);
    region("r_outreach", "Sky Station", 600, Some("f_syndicate"), "URBAN", 75.0, 80.0);
    region("r_deadzone", "The Badlands", 150, None, "WILDERNESS", 10.0, 30.0);
    region("r_coast_pass", "Indigo Coast", 900, None, "COASTAL", 30.0, 60.0);

    world_from_doc(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_shortcuts_expand() {
        let world = world_from_json(
            r#"{
                "factions": [
                    {"id": "f1", "name": "One", "power": 50, "resources": 120}
                ],
                "regions": []
            }"#,
        )
        .unwrap();
        let f = &world.factions["f1"];
        assert_eq!(f.power.army, 50.0);
        assert_eq!(f.power.navy, 0.0);
        assert_eq!(f.resources.credits, 120.0);
        assert_eq!(f.legitimacy, 50.0);
        assert!(f.is_active);
    }

    #[test]
    fn unknown_environment_and_traits_are_tolerated() {
        let world = world_from_json(
            r#"{
                "factions": [
                    {"id": "f1", "name": "One", "traits": ["Militarist", "Cheesemonger"]}
                ],
                "regions": [
                    {"id": "r1", "name": "R1", "environment": "LAVA", "owner": "f1"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(world.regions["r1"].environment, Environment::Rural);
        let traits = &world.factions["f1"].traits;
        assert_eq!(traits.len(), 1);
        assert!(traits.contains(&Trait::Militarist));
    }

    #[test]
    fn legacy_stability_field_maps_to_cohesion() {
        let world = world_from_json(
            r#"{
                "regions": [{"id": "r1", "name": "R1", "stability": 55.0}]
            }"#,
        )
        .unwrap();
        assert_eq!(world.regions["r1"].socio_economic.cohesion, 55.0);
        assert_eq!(world.regions["r1"].socio_economic.infrastructure, 20.0);
    }

    #[test]
    fn ownership_reconciled_from_both_sides() {
        // f1 lists r1; r2 names f1 directly; r3 names a ghost.
        let world = world_from_json(
            r#"{
                "factions": [{"id": "f1", "name": "One", "regions": ["r1"]}],
                "regions": [
                    {"id": "r1", "name": "R1"},
                    {"id": "r2", "name": "R2", "owner": "f1"},
                    {"id": "r3", "name": "R3", "owner": "ghost"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(world.regions["r1"].owner.as_deref(), Some("f1"));
        assert_eq!(world.regions["r2"].owner.as_deref(), Some("f1"));
        assert_eq!(world.regions["r3"].owner, None);
        assert!(world.check_invariants().is_empty());
    }

    #[test]
    fn one_sided_alliances_are_mirrored() {
        let world = world_from_json(
            r#"{
                "factions": [
                    {"id": "f1", "name": "One", "alliances": ["f2", "f1", "ghost"]},
                    {"id": "f2", "name": "Two"}
                ]
            }"#,
        )
        .unwrap();
        assert!(world.factions["f1"].alliances.contains("f2"));
        assert!(world.factions["f2"].alliances.contains("f1"));
        assert!(!world.factions["f1"].alliances.contains("f1"));
        assert!(!world.factions["f1"].alliances.contains("ghost"));
        assert!(world.check_invariants().is_empty());
    }

    #[test]
    fn export_import_round_trips_byte_equal() {
        let world = demo_world();
        let json = world_to_json(&world).unwrap();
        let reloaded = world_from_json(&json).unwrap();
        assert_eq!(world, reloaded);
        assert_eq!(json, world_to_json(&reloaded).unwrap());
    }

    #[test]
    fn demo_world_is_sound() {
        let world = demo_world();
        assert_eq!(world.factions.len(), 3);
        assert_eq!(world.regions.len(), 8);
        assert!(world.check_invariants().is_empty());
        assert_eq!(world.regions["r_deadzone"].owner, None);
        assert_eq!(world.factions["f_hegemony"].regions.len(), 2);
    }
}

use std::collections::BTreeMap;

use super::faction::Faction;
use super::region::Region;

/// The whole mutable simulation state: every faction and region, keyed by
/// id. `BTreeMap` keeps iteration and serialization order deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct World {
    pub factions: BTreeMap<String, Faction>,
    pub regions: BTreeMap<String, Region>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_faction(&self, faction_id: &str) -> Option<&Faction> {
        self.factions.get(faction_id)
    }

    pub fn get_region(&self, region_id: &str) -> Option<&Region> {
        self.regions.get(region_id)
    }

    /// Change a region's owner, keeping the owner's derived `regions` index
    /// in sync on both sides of the transfer.
    ///
    /// `Region::owner` is the single source of truth for ownership;
    /// every ownership mutation must flow through here. The new owner may
    /// not exist yet (a faction created later in the same delta); its
    /// index is reconciled when the creation record is applied.
    pub fn set_region_owner(&mut self, region_id: &str, new_owner: Option<&str>) {
        let Some(region) = self.regions.get_mut(region_id) else {
            return;
        };
        let previous = region.owner.take();
        region.owner = new_owner.filter(|o| !o.is_empty()).map(String::from);
        let current = region.owner.clone();

        if let Some(prev_id) = previous {
            if let Some(prev) = self.factions.get_mut(&prev_id) {
                prev.regions.remove(region_id);
            }
        }
        if let Some(owner_id) = current {
            if let Some(owner) = self.factions.get_mut(&owner_id) {
                owner.regions.insert(region_id.to_string());
            }
        }
    }

    /// Check the global consistency rules. Returns one message per
    /// violation; an empty vector means the world is sound.
    ///
    /// Rules: ownership is bidirectional (region.owner ⇔ faction.regions),
    /// owners exist, and alliances are symmetric and irreflexive.
    pub fn check_invariants(&self) -> Vec<String> {
        let mut violations = Vec::new();

        for (rid, region) in &self.regions {
            if let Some(owner_id) = &region.owner {
                match self.factions.get(owner_id) {
                    None => violations
                        .push(format!("region {rid} owned by unknown faction {owner_id}")),
                    Some(owner) => {
                        if !owner.regions.contains(rid) {
                            violations.push(format!(
                                "region {rid} owned by {owner_id} but missing from its region set"
                            ));
                        }
                    }
                }
            }
        }

        for (fid, faction) in &self.factions {
            for rid in &faction.regions {
                match self.regions.get(rid) {
                    None => violations.push(format!("faction {fid} claims unknown region {rid}")),
                    Some(region) => {
                        if region.owner.as_deref() != Some(fid.as_str()) {
                            violations.push(format!(
                                "faction {fid} claims region {rid} owned by {:?}",
                                region.owner
                            ));
                        }
                    }
                }
            }

            if faction.alliances.contains(fid) {
                violations.push(format!("faction {fid} is allied with itself"));
            }
            for aid in &faction.alliances {
                let reciprocal = self
                    .factions
                    .get(aid)
                    .is_some_and(|ally| ally.alliances.contains(fid));
                if !reciprocal {
                    violations.push(format!("alliance {fid} -> {aid} is not reciprocated"));
                }
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::region::{Environment, SocioEconomic};

    fn region(id: &str, owner: Option<&str>) -> Region {
        Region {
            id: id.to_string(),
            name: id.to_string(),
            population: 1000,
            owner: owner.map(String::from),
            environment: Environment::Rural,
            socio_economic: SocioEconomic::default(),
        }
    }

    fn two_faction_world() -> World {
        let mut world = World::new();
        world
            .factions
            .insert("f1".to_string(), Faction::new("f1", "One"));
        world
            .factions
            .insert("f2".to_string(), Faction::new("f2", "Two"));
        world.regions.insert("r1".to_string(), region("r1", None));
        world
    }

    #[test]
    fn set_owner_updates_both_sides() {
        let mut world = two_faction_world();
        world.set_region_owner("r1", Some("f1"));
        assert_eq!(world.regions["r1"].owner.as_deref(), Some("f1"));
        assert!(world.factions["f1"].regions.contains("r1"));

        world.set_region_owner("r1", Some("f2"));
        assert!(!world.factions["f1"].regions.contains("r1"));
        assert!(world.factions["f2"].regions.contains("r1"));
        assert!(world.check_invariants().is_empty());
    }

    #[test]
    fn empty_string_owner_clears() {
        let mut world = two_faction_world();
        world.set_region_owner("r1", Some("f1"));
        world.set_region_owner("r1", Some(""));
        assert_eq!(world.regions["r1"].owner, None);
        assert!(world.factions["f1"].regions.is_empty());
    }

    #[test]
    fn invariants_catch_one_sided_alliance() {
        let mut world = two_faction_world();
        world
            .factions
            .get_mut("f1")
            .unwrap()
            .alliances
            .insert("f2".to_string());
        let violations = world.check_invariants();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("not reciprocated"));
    }

    #[test]
    fn invariants_catch_stale_region_index() {
        let mut world = two_faction_world();
        world
            .factions
            .get_mut("f1")
            .unwrap()
            .regions
            .insert("r1".to_string());
        assert!(!world.check_invariants().is_empty());
    }
}

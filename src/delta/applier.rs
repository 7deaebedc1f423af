use crate::config::SimConfig;
use crate::model::{Faction, Region, World};

use super::types::WorldDelta;
use super::validator::{DeltaValidator, Severity, ValidationError};

/// Outcome of applying one delta. `success == false` means a validation
/// error rejected the delta and the world was left untouched.
#[derive(Debug, Default)]
pub struct ApplyResult {
    pub success: bool,
    pub errors: Vec<ValidationError>,
}

/// Applies a [`WorldDelta`] to a [`World`] in the fixed order that keeps
/// the ownership and alliance invariants intact:
///
/// 1. faction scalar fields, alliance set updates, deactivation
/// 2. region owner changes implied by `add_regions` / `remove_regions`
/// 3. region deltas (scalars + owner shortcut)
/// 4. creations, factions before regions
/// 5. deletions, regions before factions
///
/// Mutations run against a staged clone; the live world is replaced only
/// once the whole delta went through, so a rejected delta or a panic
/// mid-application never leaves partial state behind.
#[derive(Debug, Clone)]
pub struct DeltaApplier {
    validator: DeltaValidator,
    config: SimConfig,
}

impl DeltaApplier {
    pub fn new(config: SimConfig) -> Self {
        Self {
            validator: DeltaValidator::new(config.clone()),
            config,
        }
    }

    pub fn apply(&self, delta: &WorldDelta, world: &mut World) -> ApplyResult {
        let mut errors = self.validator.validate(delta, world);
        if errors.iter().any(|e| e.severity == Severity::Error) {
            return ApplyResult {
                success: false,
                errors,
            };
        }

        let mut staged = world.clone();
        self.apply_faction_scalars(delta, &mut staged);
        self.apply_ownership_changes(delta, &mut staged);
        self.apply_region_deltas(delta, &mut staged);
        self.apply_creations(delta, &mut staged);
        self.apply_deletions(delta, &mut staged);

        for violation in staged.check_invariants() {
            errors.push(ValidationError {
                severity: Severity::Warning,
                message: violation,
                entity_id: String::new(),
                field: String::new(),
                value: None,
            });
        }

        *world = staged;
        ApplyResult {
            success: true,
            errors,
        }
    }

    fn apply_faction_scalars(&self, delta: &WorldDelta, world: &mut World) {
        let bounds = self.config.faction.clone();
        for (faction_id, fd) in &delta.faction_deltas {
            // Alliance edits touch both endpoints; collect first to keep a
            // single mutable borrow on the faction map.
            let mut added_allies = Vec::new();
            let mut removed_allies = Vec::new();

            let Some(faction) = world.factions.get_mut(faction_id) else {
                continue;
            };
            if let Some(power) = fd.power {
                faction.power = power.clamp(bounds.min_branch_power, bounds.max_branch_power);
            }
            if let Some(legitimacy) = fd.legitimacy {
                faction.legitimacy =
                    legitimacy.clamp(bounds.min_legitimacy, bounds.max_legitimacy);
            }
            if let Some(resources) = fd.resources {
                let mut resources = resources.clamp(bounds.debt_floor, bounds.max_resources);
                resources.food = resources.food.max(0.0);
                resources.energy = resources.energy.max(0.0);
                resources.influence = resources.influence.max(0.0);
                faction.resources = resources;
            }
            if let Some(knowledge) = fd.knowledge {
                faction.knowledge = knowledge.max(0.0);
            }
            if fd.deactivate {
                faction.is_active = false;
            }

            for ally_id in &fd.add_alliances {
                if ally_id != faction_id {
                    faction.alliances.insert(ally_id.clone());
                    added_allies.push(ally_id.clone());
                }
            }
            for ally_id in &fd.remove_alliances {
                faction.alliances.remove(ally_id);
                removed_allies.push(ally_id.clone());
            }

            // Mirror the edits so the alliance relation stays symmetric
            // even when a delta only names one side.
            for ally_id in added_allies {
                if let Some(ally) = world.factions.get_mut(&ally_id) {
                    ally.alliances.insert(faction_id.clone());
                }
            }
            for ally_id in removed_allies {
                if let Some(ally) = world.factions.get_mut(&ally_id) {
                    ally.alliances.remove(faction_id);
                }
            }
        }
    }

    fn apply_ownership_changes(&self, delta: &WorldDelta, world: &mut World) {
        for (faction_id, fd) in &delta.faction_deltas {
            for region_id in &fd.add_regions {
                world.set_region_owner(region_id, Some(faction_id));
            }
            for region_id in &fd.remove_regions {
                let still_owned = world
                    .get_region(region_id)
                    .is_some_and(|r| r.owner.as_deref() == Some(faction_id.as_str()));
                if still_owned {
                    world.set_region_owner(region_id, None);
                }
            }
        }
    }

    fn apply_region_deltas(&self, delta: &WorldDelta, world: &mut World) {
        let region_cfg = self.config.region.clone();
        for (region_id, rd) in &delta.region_deltas {
            let Some(region) = world.regions.get_mut(region_id) else {
                continue;
            };
            if let Some(se) = rd.socio_economic {
                region.socio_economic.infrastructure = se.infrastructure.clamp(0.0, 100.0);
                region.socio_economic.cohesion = se.cohesion.clamp(0.0, 100.0);
            }
            // Shortcut applied after the full block, so a conquest's
            // stability write beats the passive recovery proposal.
            if let Some(stability) = rd.stability {
                region.socio_economic.cohesion =
                    stability.clamp(region_cfg.min_stability, region_cfg.max_stability);
            }
            if let Some(population) = rd.population {
                region.population = population.max(0);
            }
            if let Some(owner) = rd.owner.as_deref() {
                world.set_region_owner(region_id, Some(owner));
            }
        }
    }

    fn apply_creations(&self, delta: &WorldDelta, world: &mut World) {
        for (faction_id, data) in &delta.create_factions {
            if world.factions.contains_key(faction_id) {
                continue;
            }
            let bounds = &self.config.faction;
            let faction = Faction {
                id: data.id.clone(),
                name: data.name.clone(),
                power: data
                    .power
                    .clamp(bounds.min_branch_power, bounds.max_branch_power),
                legitimacy: data
                    .legitimacy
                    .clamp(bounds.min_legitimacy, bounds.max_legitimacy),
                resources: data.resources,
                knowledge: data.knowledge.max(0.0),
                regions: Default::default(),
                alliances: data.alliances.clone(),
                traits: data.traits.clone(),
                is_active: true,
                color: data.color.clone(),
            };
            world.factions.insert(faction_id.clone(), faction);
            for region_id in &data.regions {
                world.set_region_owner(region_id, Some(faction_id));
            }
        }

        for (region_id, data) in &delta.create_regions {
            if world.regions.contains_key(region_id) {
                continue;
            }
            world.regions.insert(
                region_id.clone(),
                Region {
                    id: data.id.clone(),
                    name: data.name.clone(),
                    population: data.population.max(0),
                    owner: None,
                    environment: data.environment,
                    socio_economic: data.socio_economic,
                },
            );
            if let Some(owner) = data.owner.as_deref() {
                world.set_region_owner(region_id, Some(owner));
            }
        }
    }

    fn apply_deletions(&self, delta: &WorldDelta, world: &mut World) {
        for region_id in &delta.delete_regions {
            world.set_region_owner(region_id, None);
            world.regions.remove(region_id);
        }

        for faction_id in &delta.delete_factions {
            if world.factions.remove(faction_id).is_none() {
                continue;
            }
            let owned: Vec<String> = world
                .regions
                .values()
                .filter(|r| r.owner.as_deref() == Some(faction_id.as_str()))
                .map(|r| r.id.clone())
                .collect();
            for region_id in owned {
                world.set_region_owner(&region_id, None);
            }
            for faction in world.factions.values_mut() {
                faction.alliances.remove(faction_id);
            }
        }
    }
}

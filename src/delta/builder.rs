use crate::model::{Power, Resources, SocioEconomic};

use super::types::{FactionCreation, FactionDelta, RegionCreation, RegionDelta, WorldDelta};

/// Fluent accumulator that subsystems write their proposals into.
///
/// `for_faction`/`for_region` hand out typed sub-builders over the shared
/// per-entity delta, so repeated access within a tick lands on the same
/// record and the last writer of a scalar field wins.
#[derive(Debug, Default)]
pub struct DeltaBuilder {
    delta: WorldDelta,
}

impl DeltaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_faction(&mut self, faction_id: &str) -> FactionDeltaBuilder<'_> {
        let delta = self
            .delta
            .faction_deltas
            .entry(faction_id.to_string())
            .or_default();
        FactionDeltaBuilder { delta }
    }

    pub fn for_region(&mut self, region_id: &str) -> RegionDeltaBuilder<'_> {
        let delta = self
            .delta
            .region_deltas
            .entry(region_id.to_string())
            .or_default();
        RegionDeltaBuilder { delta }
    }

    pub fn add_event(&mut self, message: impl Into<String>) -> &mut Self {
        self.delta.events.push(message.into());
        self
    }

    pub fn create_faction(&mut self, data: FactionCreation) -> &mut Self {
        self.delta.create_factions.insert(data.id.clone(), data);
        self
    }

    pub fn create_region(&mut self, data: RegionCreation) -> &mut Self {
        self.delta.create_regions.insert(data.id.clone(), data);
        self
    }

    pub fn delete_faction(&mut self, faction_id: &str) -> &mut Self {
        self.delta.delete_factions.insert(faction_id.to_string());
        self
    }

    pub fn delete_region(&mut self, region_id: &str) -> &mut Self {
        self.delta.delete_regions.insert(region_id.to_string());
        self
    }

    /// True if some earlier subsystem already re-owned this region in the
    /// current tick, whether via a direct owner write, a pending faction
    /// creation claiming it, or an `add_regions` entry. Conflict uses this
    /// to avoid double-claiming.
    pub fn has_pending_owner_change(&self, region_id: &str) -> bool {
        if self
            .delta
            .region_deltas
            .get(region_id)
            .is_some_and(|d| d.owner.is_some())
        {
            return true;
        }
        if self
            .delta
            .create_factions
            .values()
            .any(|f| f.regions.contains(region_id))
        {
            return true;
        }
        self.delta
            .faction_deltas
            .values()
            .any(|f| f.add_regions.contains(region_id))
    }

    pub fn build(self) -> WorldDelta {
        self.delta
    }
}

/// Sub-builder over one faction's pending delta.
pub struct FactionDeltaBuilder<'a> {
    delta: &'a mut FactionDelta,
}

impl FactionDeltaBuilder<'_> {
    pub fn set_power(self, power: Power) -> Self {
        self.delta.power = Some(power);
        self
    }

    pub fn set_legitimacy(self, value: f64) -> Self {
        self.delta.legitimacy = Some(value);
        self
    }

    pub fn set_resources(self, resources: Resources) -> Self {
        self.delta.resources = Some(resources);
        self
    }

    pub fn set_knowledge(self, value: f64) -> Self {
        self.delta.knowledge = Some(value);
        self
    }

    pub fn add_region(self, region_id: &str) -> Self {
        self.delta.add_regions.insert(region_id.to_string());
        self
    }

    pub fn remove_region(self, region_id: &str) -> Self {
        self.delta.remove_regions.insert(region_id.to_string());
        self
    }

    pub fn add_alliance(self, faction_id: &str) -> Self {
        self.delta.add_alliances.insert(faction_id.to_string());
        self
    }

    pub fn remove_alliance(self, faction_id: &str) -> Self {
        self.delta.remove_alliances.insert(faction_id.to_string());
        self
    }

    pub fn deactivate(self) -> Self {
        self.delta.deactivate = true;
        self
    }
}

/// Sub-builder over one region's pending delta.
pub struct RegionDeltaBuilder<'a> {
    delta: &'a mut RegionDelta,
}

impl RegionDeltaBuilder<'_> {
    pub fn set_socio_economic(self, value: SocioEconomic) -> Self {
        self.delta.socio_economic = Some(value);
        self
    }

    pub fn set_stability(self, value: f64) -> Self {
        self.delta.stability = Some(value);
        self
    }

    pub fn set_population(self, value: i64) -> Self {
        self.delta.population = Some(value);
        self
    }

    /// An empty owner id clears ownership.
    pub fn set_owner(self, owner_id: &str) -> Self {
        self.delta.owner = Some(owner_id.to_string());
        self
    }

    pub fn clear_owner(self) -> Self {
        self.delta.owner = Some(String::new());
        self
    }
}

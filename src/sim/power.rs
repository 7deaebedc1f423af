use crate::delta::DeltaBuilder;
use crate::model::{Environment, Power, Trait, World};

use super::system::{Subsystem, TickContext};

/// Per-branch military growth and decay, plus territorial bonuses.
pub struct PowerSystem;

impl Subsystem for PowerSystem {
    fn name(&self) -> &'static str {
        "power"
    }

    fn compute_delta(&self, world: &World, builder: &mut DeltaBuilder, ctx: &mut TickContext) {
        let cfg = &ctx.config.power;
        let traits = &ctx.config.traits;

        for (faction_id, faction) in &world.factions {
            if !faction.is_active {
                continue;
            }

            // Militarist takes precedence when a faction carries both.
            let growth_mod = if faction.has_trait(Trait::Militarist) {
                traits.militarist_power_growth
            } else if faction.has_trait(Trait::Pacifist) {
                traits.pacifist_power_growth
            } else {
                1.0
            };

            let mut new_power = Power {
                army: faction.power.army
                    * (1.0 + cfg.army_growth * growth_mod)
                    * (1.0 - cfg.army_decay),
                navy: faction.power.navy
                    * (1.0 + cfg.navy_growth * growth_mod)
                    * (1.0 - cfg.navy_decay),
                air: faction.power.air
                    * (1.0 + cfg.air_growth * growth_mod)
                    * (1.0 - cfg.air_decay),
            };

            let region_bonus = faction.regions.len() as f64 * cfg.region_power_factor;
            new_power.army += region_bonus * cfg.region_army_share;
            new_power.navy += region_bonus * cfg.region_navy_share;
            new_power.air += region_bonus * cfg.region_air_share;

            for region_id in &faction.regions {
                if world
                    .get_region(region_id)
                    .is_some_and(|r| r.environment == Environment::Coastal)
                {
                    new_power.navy += cfg.coastal_navy_bonus;
                }
            }

            let bounds = &ctx.config.faction;
            let new_power = new_power.clamp(bounds.min_branch_power, bounds.max_branch_power);

            if new_power != faction.power {
                builder.for_faction(faction_id).set_power(new_power);
            }
        }
    }
}

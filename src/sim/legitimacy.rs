use crate::delta::DeltaBuilder;
use crate::metrics::gini;
use crate::model::{Trait, World};

use super::system::{Subsystem, TickContext};

/// Political legitimacy drift: decay, cohesion support, inequality and
/// expansion penalties, alliance prestige.
pub struct LegitimacySystem;

impl Subsystem for LegitimacySystem {
    fn name(&self) -> &'static str {
        "legitimacy"
    }

    fn compute_delta(&self, world: &World, builder: &mut DeltaBuilder, ctx: &mut TickContext) {
        let cfg = &ctx.config.legitimacy;
        let traits = &ctx.config.traits;
        let bounds = &ctx.config.faction;

        let powers: Vec<f64> = world
            .factions
            .values()
            .filter(|f| f.is_active && f.power.total() > 0.0)
            .map(|f| f.power.total())
            .collect();
        let power_gini = gini(&powers);

        for (faction_id, faction) in &world.factions {
            if !faction.is_active {
                continue;
            }

            let mut new_value = faction.legitimacy * (1.0 - cfg.base_decay);

            if !faction.regions.is_empty() {
                let cohesions: Vec<f64> = faction
                    .regions
                    .iter()
                    .filter_map(|rid| world.get_region(rid))
                    .map(|r| r.socio_economic.cohesion)
                    .collect();
                if !cohesions.is_empty() {
                    let avg = cohesions.iter().sum::<f64>() / cohesions.len() as f64;
                    let mut impact = cfg.cohesion_factor;
                    if faction.has_trait(Trait::Autocrat) {
                        impact *= traits.autocrat_cohesion_impact;
                    }
                    new_value += avg * impact;
                }
            }

            let mut gini_penalty = power_gini * cfg.inequality_penalty * 100.0;
            if faction.has_trait(Trait::Populist) {
                gini_penalty *= traits.populist_inequality_penalty;
            }
            new_value -= gini_penalty;

            let threshold = ctx.config.economy.resource_starvation_threshold;
            if faction.resources.credits < threshold || faction.resources.materials < threshold {
                new_value -= cfg.starvation_loss;
            }

            let mut alliance_bonus = faction.alliances.len() as f64 * cfg.alliance_bonus;
            if faction.has_trait(Trait::Diplomat) {
                alliance_bonus *= traits.diplomat_alliance_legitimacy;
            }
            new_value += alliance_bonus;

            let mut expansion_penalty =
                faction.regions.len() as f64 * cfg.expansion_penalty_factor;
            if faction.has_trait(Trait::Imperialist) {
                expansion_penalty *= traits.imperialist_expansion_penalty;
            }
            new_value -= expansion_penalty;

            if faction.regions.len() <= 1 {
                new_value -= cfg.stagnation_penalty;
            }

            if faction.has_trait(Trait::Pacifist) {
                new_value *= traits.pacifist_legitimacy;
            }

            let new_value = new_value.clamp(bounds.min_legitimacy, bounds.max_legitimacy);
            if new_value != faction.legitimacy {
                builder.for_faction(faction_id).set_legitimacy(new_value);
            }
        }
    }
}

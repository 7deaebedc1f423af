use rand::Rng;
use rand::seq::IndexedRandom;

use crate::delta::DeltaBuilder;
use crate::model::{Resources, World};

use super::system::{Subsystem, TickContext};

/// Occasional domestic spending: a faction sinks credits into a random
/// owned region, favoring stability over infrastructure.
pub struct InvestmentSystem;

impl Subsystem for InvestmentSystem {
    fn name(&self) -> &'static str {
        "investment"
    }

    fn compute_delta(&self, world: &World, builder: &mut DeltaBuilder, ctx: &mut TickContext) {
        let cfg = ctx.config.investment.clone();

        for (faction_id, faction) in &world.factions {
            if !faction.is_active || faction.regions.is_empty() {
                continue;
            }
            if ctx.rng.random_range(0.0..1.0) >= cfg.chance {
                continue;
            }

            let owned: Vec<&str> = faction.regions.iter().map(String::as_str).collect();
            let Some(region) = owned
                .choose(ctx.rng)
                .and_then(|rid| world.get_region(rid))
            else {
                continue;
            };

            if ctx.rng.random_range(0.0..1.0) < cfg.stability_share {
                if faction.resources.credits >= cfg.stability_cost {
                    let new_stability =
                        (region.socio_economic.cohesion + cfg.stability_gain).min(100.0);
                    builder.for_region(&region.id).set_stability(new_stability);
                    builder.for_faction(faction_id).set_resources(
                        faction.resources
                            - Resources {
                                credits: cfg.stability_cost,
                                ..Resources::default()
                            },
                    );
                    builder.add_event(format!(
                        "INVESTMENT: {} funded stability programs in {}.",
                        faction.name, region.name
                    ));
                }
            } else if faction.resources.credits >= cfg.infrastructure_cost {
                let new_infrastructure =
                    (region.socio_economic.infrastructure + cfg.infrastructure_gain).min(100.0);
                let mut se = region.socio_economic;
                se.infrastructure = new_infrastructure;
                builder.for_region(&region.id).set_socio_economic(se);
                builder.for_faction(faction_id).set_resources(
                    faction.resources
                        - Resources {
                            credits: cfg.infrastructure_cost,
                            ..Resources::default()
                        },
                );
                builder.add_event(format!(
                    "INVESTMENT: {} expanded infrastructure in {} ({:.0}%).",
                    faction.name, region.name, new_infrastructure
                ));
            }
        }
    }
}

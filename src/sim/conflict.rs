use std::collections::BTreeSet;

use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, RngCore};

use crate::delta::{DeltaBuilder, FactionCreation};
use crate::model::{Power, Resources, Trait, World};

use super::system::{Subsystem, TickContext};

/// The destructive transitions, run last in the pipeline so same-tick
/// collapses see post-war state: insurrections in unowned regions,
/// secession of disaffected regions, then per faction: collapse,
/// revolution, civil war, coup, in that order.
pub struct ConflictSystem;

impl Subsystem for ConflictSystem {
    fn name(&self) -> &'static str {
        "conflict"
    }

    fn compute_delta(&self, world: &World, builder: &mut DeltaBuilder, ctx: &mut TickContext) {
        let cfg = ctx.config.conflict.clone();
        let trait_cfg = ctx.config.traits.clone();

        for (region_id, region) in &world.regions {
            let Some(owner_id) = region.owner.as_deref() else {
                if builder.has_pending_owner_change(region_id) {
                    continue;
                }
                if ctx.rng.random_range(0.0..1.0) < cfg.insurrection_chance {
                    // Ids are minted from the tick RNG; replay must be able
                    // to reproduce them.
                    let new_id = format!("nascent_{:08x}", ctx.rng.next_u32());
                    let new_name = format!("Commonalty of {}", region.name);
                    builder
                        .for_region(region_id)
                        .set_owner(&new_id)
                        .set_stability(
                            cfg.revolt_stability_threshold + cfg.insurrection_stability_bonus,
                        );
                    let traits = draw_traits(ctx.rng);
                    builder.create_faction(FactionCreation {
                        id: new_id,
                        name: new_name.clone(),
                        power: Power {
                            army: cfg.insurrection_army,
                            ..Power::default()
                        },
                        legitimacy: cfg.insurrection_legitimacy,
                        resources: Resources {
                            credits: cfg.insurrection_credits,
                            ..Resources::default()
                        },
                        knowledge: 0.0,
                        regions: [region_id.clone()].into(),
                        alliances: BTreeSet::new(),
                        traits,
                        color: "#00FF00".to_string(),
                    });
                    builder.add_event(format!(
                        "INSURRECTION: {} established independence in {}!",
                        new_name, region.name
                    ));
                }
                continue;
            };

            if region.socio_economic.cohesion < cfg.revolt_stability_threshold
                && ctx.rng.random_range(0.0..1.0) < cfg.revolt_chance
            {
                let owner_name = world
                    .get_faction(owner_id)
                    .map(|f| f.name.clone())
                    .unwrap_or_else(|| owner_id.to_string());
                builder
                    .for_region(region_id)
                    .clear_owner()
                    .set_stability(
                        (region.socio_economic.cohesion - cfg.revolt_stability_loss).max(0.0),
                    );
                builder.add_event(format!(
                    "REVOLT: {} declared independence from {}.",
                    region.name, owner_name
                ));
                let fb = builder.for_faction(owner_id).remove_region(region_id);
                if let Some(owner) = world.get_faction(owner_id) {
                    let loss = Power {
                        army: cfg.revolt_power_loss * cfg.revolt_army_share,
                        navy: cfg.revolt_power_loss * cfg.revolt_navy_share,
                        air: cfg.revolt_power_loss * cfg.revolt_air_share,
                    };
                    fb.set_power(owner.power - loss);
                }
            }
        }

        for (faction_id, faction) in &world.factions {
            if !faction.is_active {
                continue;
            }

            let collapse = &ctx.config.collapse;
            if faction.power.total() < collapse.power_floor
                || faction.legitimacy < collapse.legitimacy_floor
            {
                builder.for_faction(faction_id).deactivate();
                builder.add_event(format!(
                    "COLLAPSE: Faction {} ({}) has collapsed!",
                    faction.name, faction_id
                ));
                for region_id in &faction.regions {
                    builder.for_region(region_id).clear_owner();
                }
                continue;
            }

            let mut revolution_threshold = ctx.config.legitimacy.revolution_threshold;
            if faction.has_trait(Trait::Populist) {
                revolution_threshold *= trait_cfg.populist_revolution_threshold;
            }
            if faction.legitimacy < revolution_threshold
                && ctx.rng.random_range(0.0..1.0) < ctx.config.legitimacy.revolution_chance
            {
                builder.add_event(format!(
                    "REVOLUTION: revolution erupted in {}!",
                    faction.name
                ));
                builder
                    .for_faction(faction_id)
                    .set_power(faction.power * cfg.revolution_power_remaining);
                for region_id in &faction.regions {
                    if let Some(region) = world.get_region(region_id) {
                        builder.for_region(region_id).set_stability(
                            (region.socio_economic.cohesion - cfg.revolution_stability_penalty)
                                .max(0.0),
                        );
                    }
                }
            }

            let civil_war_risk = cfg.civil_war_chance
                + (1.0 - faction.legitimacy / 100.0) * cfg.civil_war_legitimacy_factor;
            if ctx.rng.random_range(0.0..1.0) < civil_war_risk && faction.regions.len() >= 2 {
                builder.add_event(format!(
                    "CIVIL WAR: civil war broke out in {}!",
                    faction.name
                ));

                let mut regions_list: Vec<&str> =
                    faction.regions.iter().map(String::as_str).collect();
                regions_list.shuffle(ctx.rng);
                let rebel_regions = &regions_list[..regions_list.len() / 2];

                let rebel_id = format!("rebels_{:08x}", ctx.rng.next_u32());
                let rebel_name = format!("Rebels of {}", faction.name);

                builder
                    .for_faction(faction_id)
                    .set_power(faction.power * cfg.civil_war_parent_power_ratio);
                for region_id in rebel_regions {
                    builder.for_faction(faction_id).remove_region(region_id);
                    builder.for_region(region_id).set_owner(&rebel_id);
                }

                let traits = draw_traits(ctx.rng);
                builder.create_faction(FactionCreation {
                    id: rebel_id,
                    name: rebel_name.clone(),
                    power: faction.power * cfg.civil_war_rebel_power_ratio,
                    legitimacy: cfg.civil_war_rebel_legitimacy,
                    resources: faction.resources * cfg.civil_war_rebel_resource_ratio,
                    knowledge: 0.0,
                    regions: rebel_regions.iter().map(|s| s.to_string()).collect(),
                    alliances: BTreeSet::new(),
                    traits,
                    color: "#FF0000".to_string(),
                });
                builder.add_event(format!(
                    "NEW FACTION: {} formed from the civil war.",
                    rebel_name
                ));
            }

            let mut coup_chance = cfg.coup_chance;
            if faction.has_trait(Trait::Autocrat) {
                coup_chance *= trait_cfg.autocrat_coup_chance;
            }
            if ctx.rng.random_range(0.0..1.0) < coup_chance {
                builder.add_event(format!("COUP: military coup in {}!", faction.name));
                builder
                    .for_faction(faction_id)
                    .set_power(
                        faction.power
                            + Power::new(cfg.coup_army_gain, cfg.coup_navy_gain, cfg.coup_air_gain),
                    )
                    .set_legitimacy((faction.legitimacy - cfg.coup_legitimacy_loss).max(0.0));
                for region_id in &faction.regions {
                    if let Some(region) = world.get_region(region_id) {
                        builder.for_region(region_id).set_stability(
                            (region.socio_economic.cohesion - cfg.coup_stability_loss).max(0.0),
                        );
                    }
                }
            }
        }
    }
}

fn draw_traits(rng: &mut dyn RngCore) -> BTreeSet<Trait> {
    let count = rng.random_range(1..=2);
    Trait::ALL.choose_multiple(rng, count).copied().collect()
}

use crate::delta::DeltaBuilder;
use crate::model::{Environment, Resources, Trait, World};

use super::system::{Subsystem, TickContext};

/// Resource production and consumption: base income, per-region yields by
/// environment, food/energy requirements, military upkeep, corruption and
/// spoilage. Shortages clamp to zero and bleed legitimacy.
pub struct EconomySystem;

impl Subsystem for EconomySystem {
    fn name(&self) -> &'static str {
        "economy"
    }

    fn compute_delta(&self, world: &World, builder: &mut DeltaBuilder, ctx: &mut TickContext) {
        let cfg = &ctx.config.economy;
        let traits = &ctx.config.traits;
        let bounds = &ctx.config.faction;

        for (faction_id, faction) in &world.factions {
            if !faction.is_active {
                continue;
            }

            let income_mod = if faction.has_trait(Trait::Industrialist) {
                traits.industrialist_income
            } else {
                1.0
            };

            let mut income = Resources {
                credits: cfg.base_credits_income * income_mod,
                materials: cfg.base_materials_income * income_mod,
                food: cfg.base_food_income,
                energy: cfg.base_energy_income,
                influence: cfg.base_influence_income,
            };

            let mut total_population = 0i64;
            for region_id in &faction.regions {
                let Some(region) = world.get_region(region_id) else {
                    continue;
                };
                total_population += region.population;

                let pop_factor = region.population as f64 / 1000.0;
                let dev = 1.0 + region.socio_economic.infrastructure / 100.0;
                let eff = region.socio_economic.cohesion / 100.0;
                let scale = dev * eff;

                match region.environment {
                    Environment::Urban => {
                        income.credits += cfg.region_credits_factor * pop_factor * 2.0 * scale;
                        income.energy -= cfg.urban_energy_drain;
                    }
                    Environment::Coastal => {
                        income.credits += cfg.region_credits_factor * pop_factor * 1.25 * scale;
                        income.materials += cfg.region_materials_factor * 0.5 * scale;
                        income.food += cfg.coastal_food_yield * pop_factor * scale;
                    }
                    Environment::Industrial => {
                        income.materials += cfg.industrial_materials_yield * scale;
                        income.energy += cfg.industrial_energy_yield * scale;
                        income.credits += cfg.region_credits_factor * 0.5 * scale;
                    }
                    Environment::Rural => {
                        income.food += cfg.rural_food_yield * pop_factor * scale;
                        income.materials += cfg.region_materials_factor * 0.5 * scale;
                    }
                    Environment::Wilderness => {
                        income.materials += cfg.region_materials_factor * 0.3 * scale;
                    }
                }
            }

            let food_req = total_population as f64 * cfg.food_per_population;
            let energy_req = faction.power.total() * cfg.energy_per_power;
            income.food -= food_req;
            income.energy -= energy_req;

            let upkeep_mod = if faction.has_trait(Trait::Militarist) {
                traits.militarist_upkeep
            } else {
                1.0
            };
            income.credits -= faction.power.total() * cfg.upkeep_power_factor * upkeep_mod;

            let mut new_resources = faction.resources + income;

            if new_resources.food < 0.0 {
                let shortfall_ratio = new_resources.food.abs() / (food_req + 1.0);
                let legitimacy_loss =
                    shortfall_ratio * ctx.config.legitimacy.starvation_loss * 5.0;
                builder
                    .for_faction(faction_id)
                    .set_legitimacy((faction.legitimacy - legitimacy_loss).max(0.0));
                builder.add_event(format!(
                    "FOOD SHORTAGE: {} cannot feed its population; legitimacy is slipping.",
                    faction.name
                ));
                new_resources.food = 0.0;
            }
            if new_resources.energy < 0.0 {
                builder.add_event(format!(
                    "ENERGY CRISIS: {} cannot power its military.",
                    faction.name
                ));
                new_resources.energy = 0.0;
            }

            let corruption_mod = if faction.has_trait(Trait::Technocrat) {
                traits.technocrat_corruption
            } else {
                1.0
            };
            let tax = cfg.corruption_factor * corruption_mod;
            new_resources.credits *= 1.0 - tax;
            new_resources.materials *= 1.0 - tax;
            new_resources.food *= 1.0 - cfg.perishable_decay;
            new_resources.energy *= 1.0 - cfg.perishable_decay;

            let new_resources = new_resources.clamp(bounds.debt_floor, bounds.max_resources);

            if new_resources != faction.resources {
                builder.for_faction(faction_id).set_resources(new_resources);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::model::{Faction, Power, Region, SocioEconomic};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn run(world: &World) -> crate::delta::WorldDelta {
        let config = SimConfig::default();
        let mut rng = SmallRng::seed_from_u64(1);
        let mut builder = DeltaBuilder::new();
        let mut ctx = TickContext {
            config: &config,
            rng: &mut rng,
        };
        EconomySystem.compute_delta(world, &mut builder, &mut ctx);
        builder.build()
    }

    fn world_one_faction(env: Environment, population: i64) -> World {
        let mut world = World::new();
        let mut f = Faction::new("f1", "One");
        f.resources = Resources {
            credits: 100.0,
            materials: 50.0,
            food: 20.0,
            energy: 20.0,
            influence: 5.0,
        };
        world.factions.insert("f1".to_string(), f);
        world.regions.insert(
            "r1".to_string(),
            Region {
                id: "r1".to_string(),
                name: "R1".to_string(),
                population,
                owner: None,
                environment: env,
                socio_economic: SocioEconomic {
                    infrastructure: 50.0,
                    cohesion: 100.0,
                },
            },
        );
        world.set_region_owner("r1", Some("f1"));
        world
    }

    #[test]
    fn rural_region_yields_food() {
        let world = world_one_faction(Environment::Rural, 2000);
        let delta = run(&world);
        let res = delta.faction_deltas["f1"].resources.unwrap();
        // base 1.0 + 1.0 * 2.0 * 1.5 - consumption 10, then 2% decay
        let expected = (20.0 + 1.0 + 2.0 * 1.5 - 2000.0 * 0.005) * 0.98;
        assert!((res.food - expected).abs() < 1e-9, "food = {}", res.food);
    }

    #[test]
    fn upkeep_scales_with_power() {
        let mut world = world_one_faction(Environment::Rural, 1000);
        world.factions.get_mut("f1").unwrap().power = Power::new(50.0, 30.0, 20.0);
        let delta = run(&world);
        let res = delta.faction_deltas["f1"].resources.unwrap();
        // 100 total power: 20 credits upkeep against 10 base income.
        let expected = (100.0 + 10.0 - 100.0 * 0.2) * (1.0 - 0.02);
        assert!(
            (res.credits - expected).abs() < 1e-9,
            "credits = {}",
            res.credits
        );
    }

    #[test]
    fn starvation_clamps_food_and_costs_legitimacy() {
        let mut world = world_one_faction(Environment::Urban, 9000);
        world.factions.get_mut("f1").unwrap().resources.food = 0.0;
        let delta = run(&world);
        let fd = &delta.faction_deltas["f1"];
        assert_eq!(fd.resources.unwrap().food, 0.0);
        assert!(fd.legitimacy.unwrap() < 50.0);
        assert!(delta.events.iter().any(|e| e.contains("FOOD SHORTAGE")));
    }

    #[test]
    fn energy_crisis_emits_event() {
        let mut world = world_one_faction(Environment::Rural, 1000);
        let f = world.factions.get_mut("f1").unwrap();
        f.resources.energy = 0.0;
        f.power = Power::new(90.0, 0.0, 0.0);
        let delta = run(&world);
        assert_eq!(delta.faction_deltas["f1"].resources.unwrap().energy, 0.0);
        assert!(delta.events.iter().any(|e| e.contains("ENERGY CRISIS")));
    }

    #[test]
    fn technocrats_lose_less_to_corruption() {
        let plain = run(&world_one_faction(Environment::Rural, 1000));
        let mut world = world_one_faction(Environment::Rural, 1000);
        world
            .factions
            .get_mut("f1")
            .unwrap()
            .traits
            .insert(Trait::Technocrat);
        let technocrat = run(&world);
        assert!(
            technocrat.faction_deltas["f1"].resources.unwrap().credits
                > plain.faction_deltas["f1"].resources.unwrap().credits
        );
    }
}

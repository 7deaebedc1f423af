use crate::delta::DeltaBuilder;
use crate::model::{Environment, World};

use super::system::{Subsystem, TickContext};

/// Passive regional evolution: infrastructure build-up in cohesive
/// regions, cohesion recovery, and population growth.
pub struct RegionSystem;

impl Subsystem for RegionSystem {
    fn name(&self) -> &'static str {
        "region"
    }

    fn compute_delta(&self, world: &World, builder: &mut DeltaBuilder, ctx: &mut TickContext) {
        let cfg = &ctx.config.region;

        for (region_id, region) in &world.regions {
            let se = region.socio_economic;
            let mut new_se = se;

            if se.cohesion > 70.0 {
                let mult = match region.environment {
                    Environment::Urban => cfg.urban_infrastructure_mult,
                    Environment::Wilderness => cfg.wilderness_infrastructure_mult,
                    _ => 1.0,
                };
                new_se.infrastructure =
                    (se.infrastructure + cfg.infrastructure_growth * mult).min(100.0);
            }

            if se.cohesion < 100.0 {
                let recovery = cfg.cohesion_recovery_base + se.infrastructure / 200.0;
                new_se.cohesion = (se.cohesion + recovery).min(100.0);
            }

            let mut new_population = region.population;
            if region.population < cfg.max_population {
                let rate = match region.environment {
                    Environment::Urban => cfg.urban_growth_rate,
                    Environment::Rural => cfg.rural_growth_rate,
                    Environment::Industrial => cfg.industrial_growth_rate,
                    Environment::Coastal => cfg.coastal_growth_rate,
                    Environment::Wilderness => cfg.wilderness_growth_rate,
                };
                let growth =
                    (region.population as f64 * rate * (1.0 + se.infrastructure / 100.0)) as i64;
                new_population = (region.population + growth.max(1)).min(cfg.max_population);
            }

            if new_se != se {
                builder.for_region(region_id).set_socio_economic(new_se);
            }
            if new_population != region.population {
                builder.for_region(region_id).set_population(new_population);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::model::{Region, SocioEconomic};
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
        RegionSystem.compute_delta(world, &mut builder, &mut ctx);
        builder.build()
    }

    fn world_with_region(env: Environment, population: i64, se: SocioEconomic) -> World {
        let mut world = World::new();
        world.regions.insert(
            "r1".to_string(),
            Region {
                id: "r1".to_string(),
                name: "R1".to_string(),
                population,
                owner: None,
                environment: env,
                socio_economic: se,
            },
        );
        world
    }

    #[test]
    fn cohesive_region_builds_infrastructure() {
        let world = world_with_region(
            Environment::Urban,
            1000,
            SocioEconomic {
                infrastructure: 50.0,
                cohesion: 80.0,
            },
        );
        let delta = run(&world);
        let se = delta.region_deltas["r1"].socio_economic.unwrap();
        // 0.1 * 1.5 urban multiplier
        assert!((se.infrastructure - 50.15).abs() < 1e-9);
    }

    #[test]
    fn low_cohesion_recovers_with_infrastructure() {
        let world = world_with_region(
            Environment::Rural,
            1000,
            SocioEconomic {
                infrastructure: 40.0,
                cohesion: 60.0,
            },
        );
        let delta = run(&world);
        let se = delta.region_deltas["r1"].socio_economic.unwrap();
        assert!((se.cohesion - 60.4).abs() < 1e-9);
    }

    #[test]
    fn population_grows_at_least_one_and_caps() {
        let world = world_with_region(
            Environment::Wilderness,
            100,
            SocioEconomic {
                infrastructure: 0.0,
                cohesion: 100.0,
            },
        );
        let delta = run(&world);
        // 100 * 0.001 rounds to 0; floor of 1 applies.
        assert_eq!(delta.region_deltas["r1"].population, Some(101));

        let world = world_with_region(Environment::Urban, 10_000, SocioEconomic::default());
        let delta = run(&world);
        assert!(
            !delta.region_deltas.contains_key("r1")
                || delta.region_deltas["r1"].population.is_none()
        );
    }

    #[test]
    fn stable_full_region_emits_nothing() {
        let world = world_with_region(
            Environment::Rural,
            10_000,
            SocioEconomic {
                infrastructure: 100.0,
                cohesion: 100.0,
            },
        );
        let delta = run(&world);
        assert!(delta.region_deltas.is_empty());
    }
}

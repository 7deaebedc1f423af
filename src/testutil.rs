//! Shared helpers for unit and integration tests: small world builders
//! and single-subsystem tick drivers.

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::SimConfig;
use crate::delta::{DeltaBuilder, WorldDelta};
use crate::model::{Environment, Faction, Power, Region, Resources, SocioEconomic, World};
use crate::sim::{Subsystem, TickContext};

/// Run one subsystem against `world` with a fresh seeded RNG and return
/// the delta it proposed.
pub fn run_subsystem(
    system: &dyn Subsystem,
    world: &World,
    config: &SimConfig,
    seed: u64,
) -> WorldDelta {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut builder = DeltaBuilder::new();
    let mut ctx = TickContext {
        config,
        rng: &mut rng,
    };
    system.compute_delta(world, &mut builder, &mut ctx);
    builder.build()
}

/// Run the full fixed pipeline over `world` with one shared builder, the
/// way the engine does inside a tick, and return the merged delta.
pub fn run_pipeline(
    systems: &[Box<dyn Subsystem>],
    world: &World,
    config: &SimConfig,
    seed: u64,
) -> WorldDelta {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut builder = DeltaBuilder::new();
    let mut ctx = TickContext {
        config,
        rng: &mut rng,
    };
    for system in systems {
        system.compute_delta(world, &mut builder, &mut ctx);
    }
    builder.build()
}

/// A faction with the given army power and legitimacy, everything else
/// defaulted.
pub fn faction(id: &str, army: f64, legitimacy: f64) -> Faction {
    let mut f = Faction::new(id, id);
    f.power = Power::new(army, 0.0, 0.0);
    f.legitimacy = legitimacy;
    f.resources = Resources {
        credits: 50.0,
        materials: 50.0,
        food: 20.0,
        energy: 20.0,
        influence: 5.0,
    };
    f
}

pub fn region(id: &str, environment: Environment, population: i64, cohesion: f64) -> Region {
    Region {
        id: id.to_string(),
        name: id.to_string(),
        population,
        owner: None,
        environment,
        socio_economic: SocioEconomic {
            infrastructure: 20.0,
            cohesion,
        },
    }
}

/// One faction owning one region, the smallest world the full pipeline
/// can do something interesting with.
pub fn single_faction_world() -> World {
    let mut world = World::new();
    world
        .factions
        .insert("f1".to_string(), faction("f1", 60.0, 50.0));
    world
        .regions
        .insert("r1".to_string(), region("r1", Environment::Rural, 1000, 100.0));
    world.set_region_owner("r1", Some("f1"));
    world
}

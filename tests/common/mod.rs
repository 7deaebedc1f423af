use geosim::model::{Environment, Faction, Power, Region, Resources, SocioEconomic, World};
use geosim::{SessionStore, SimulationEngine};

/// Engine over a throwaway in-memory store.
pub async fn memory_engine() -> SimulationEngine {
    SimulationEngine::new("sqlite::memory:")
        .await
        .expect("in-memory store")
}

/// Engine sharing a caller-provided store (so tests can inspect the
/// persisted rows, or point two engines at the same database).
pub fn engine_on(store: SessionStore) -> SimulationEngine {
    SimulationEngine::with_store(store)
}

/// Create a session, initialize it with `world` and return the session id.
pub async fn start_session(
    engine: &mut SimulationEngine,
    name: &str,
    seed: u64,
    world: World,
) -> String {
    let session_id = engine
        .create_session(name, seed)
        .await
        .expect("create_session");
    engine.initialize_world(world).await.expect("initialize_world");
    session_id
}

pub fn faction(id: &str, name: &str, power: Power, legitimacy: f64) -> Faction {
    let mut f = Faction::new(id, name);
    f.power = power;
    f.legitimacy = legitimacy;
    f.resources = Resources {
        credits: 100.0,
        materials: 50.0,
        food: 20.0,
        energy: 20.0,
        influence: 5.0,
    };
    f
}

pub fn region(
    id: &str,
    name: &str,
    environment: Environment,
    population: i64,
    infrastructure: f64,
    cohesion: f64,
) -> Region {
    Region {
        id: id.to_string(),
        name: name.to_string(),
        population,
        owner: None,
        environment,
        socio_economic: SocioEconomic {
            infrastructure,
            cohesion,
        },
    }
}

/// The S1 world: one faction (60/30/20, legitimacy 50) holding a single
/// rural region of 1000 people at full cohesion.
pub fn single_faction_world() -> World {
    let mut world = World::new();
    world.factions.insert(
        "f1".to_string(),
        faction("f1", "Lone Power", Power::new(60.0, 30.0, 20.0), 50.0),
    );
    world.regions.insert(
        "r1".to_string(),
        region("r1", "Heartland", Environment::Rural, 1000, 20.0, 100.0),
    );
    world.set_region_owner("r1", Some("f1"));
    world
}

/// True if any event names a destructive conflict transition.
pub fn has_conflict_event(events: &[String]) -> bool {
    const MARKERS: [&str; 7] = [
        "WAR",
        "COLLAPSE",
        "REVOLT",
        "INSURRECTION",
        "CIVIL WAR",
        "REVOLUTION",
        "COUP",
    ];
    events
        .iter()
        .any(|e| MARKERS.iter().any(|m| e.contains(m)))
}

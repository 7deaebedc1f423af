use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::SimConfig;
use crate::db::SessionStore;
use crate::delta::{DeltaApplier, DeltaBuilder, Severity, WorldDelta};
use crate::error::EngineError;
use crate::metrics::{self, MetricsReport};
use crate::model::World;
use crate::scenario;
use crate::sim::{Subsystem, TickContext, default_pipeline};

/// Blob persisted in the session row: the seed plus the full tuning
/// block, everything needed to reload a session and keep stepping it
/// deterministically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub seed: u64,
    #[serde(default)]
    pub config: SimConfig,
}

/// The simulation engine: owns the sole mutable [`World`], runs the fixed
/// subsystem pipeline each tick and journals every tick to the store.
///
/// A tick only commits as a unit, in memory and on disk. The pipeline
/// computes a delta against the immutable pre-tick world, the applier
/// mutates a staged copy, the store persists delta and snapshot in one
/// transaction, and only then do `world` and `current_tick` advance. A
/// panicking subsystem or a failed write leaves the engine at the last
/// persisted tick.
pub struct SimulationEngine {
    config: SimConfig,
    store: SessionStore,
    applier: DeltaApplier,
    systems: Vec<Box<dyn Subsystem>>,
    world: Option<World>,
    session_id: Option<String>,
    current_tick: i64,
    seed: u64,
}

impl SimulationEngine {
    /// Open the store at `db_url` (e.g. a file path URL or
    /// `sqlite::memory:`) with the default configuration.
    pub async fn new(db_url: &str) -> Result<Self, EngineError> {
        Ok(Self::with_store(SessionStore::connect(db_url).await?))
    }

    pub fn with_store(store: SessionStore) -> Self {
        let config = SimConfig::default();
        Self {
            applier: DeltaApplier::new(config.clone()),
            systems: default_pipeline(),
            config,
            store,
            world: None,
            session_id: None,
            current_tick: 0,
            seed: 0,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn current_tick(&self) -> i64 {
        self.current_tick
    }

    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    /// Create a new named session with the given RNG seed. The seed is
    /// persisted with the session, so reloading it resumes the exact same
    /// timeline.
    pub async fn create_session(&mut self, name: &str, seed: u64) -> Result<String, EngineError> {
        let blob = serde_json::to_string(&SessionConfig {
            seed,
            config: self.config.clone(),
        })?;
        let session_id = self.store.create_session(name, &blob).await?;
        info!(session = %session_id, name, seed, "created session");
        self.session_id = Some(session_id.clone());
        self.world = None;
        self.current_tick = 0;
        self.seed = seed;
        Ok(session_id)
    }

    /// Set the initial world and persist it as the tick-0 snapshot. Must
    /// be the first call after [`Self::create_session`].
    pub async fn initialize_world(&mut self, world: World) -> Result<(), EngineError> {
        let session_id = self
            .session_id
            .clone()
            .ok_or(EngineError::SessionNotInitialized)?;
        for violation in world.check_invariants() {
            warn!(session = %session_id, "initial world: {violation}");
        }
        let snapshot = scenario::world_to_json(&world)?;
        self.store
            .save_step(&session_id, 0, None, Some(&snapshot))
            .await?;
        self.world = Some(world);
        self.current_tick = 0;
        Ok(())
    }

    /// Advance the simulation by `ticks` ticks and return the emitted
    /// narrative events, each prefixed with its tick number.
    pub async fn step(&mut self, ticks: u32) -> Result<Vec<String>, EngineError> {
        let session_id = self
            .session_id
            .clone()
            .ok_or(EngineError::SessionNotInitialized)?;
        if self.world.is_none() {
            return Err(EngineError::WorldNotInitialized);
        }

        let mut all_events = Vec::new();
        for _ in 0..ticks {
            let tick = self.current_tick + 1;
            let world = self.world.as_ref().ok_or(EngineError::WorldNotInitialized)?;

            let mut builder = DeltaBuilder::new();
            let mut rng = tick_rng(self.seed, tick);
            let mut ctx = TickContext {
                config: &self.config,
                rng: &mut rng,
            };
            for system in &self.systems {
                system.compute_delta(world, &mut builder, &mut ctx);
            }
            let delta = builder.build();

            let mut next = world.clone();
            let outcome = self.applier.apply(&delta, &mut next);
            for error in &outcome.errors {
                match error.severity {
                    Severity::Error => {
                        warn!(tick, entity = %error.entity_id, "validation error: {}", error.message)
                    }
                    _ => info!(tick, entity = %error.entity_id, "validation: {}", error.message),
                }
            }

            let delta_json = serde_json::to_string(&delta)?;
            let snapshot_json = if tick % self.config.simulation.snapshot_interval == 0 {
                let effective = if outcome.success { &next } else { world };
                Some(scenario::world_to_json(effective)?)
            } else {
                None
            };

            self.store
                .save_step(&session_id, tick, Some(&delta_json), snapshot_json.as_deref())
                .await?;

            if outcome.success {
                self.world = Some(next);
            }
            self.current_tick = tick;

            for event in &delta.events {
                let formatted = format!("[Tick {tick}] {event}");
                info!("{formatted}");
                all_events.push(formatted);
            }
        }
        Ok(all_events)
    }

    /// Load a session at `tick` (or its latest tick): deserialize the
    /// newest snapshot at or before the target and replay the journaled
    /// deltas up to it through the same applier the live path uses.
    pub async fn load_session(
        &mut self,
        session_id: &str,
        tick: Option<i64>,
    ) -> Result<(), EngineError> {
        let config_json = self
            .store
            .session_config(session_id)
            .await?
            .ok_or_else(|| EngineError::SessionNotFound(session_id.to_string()))?;
        let session_config: SessionConfig = serde_json::from_str(&config_json)?;

        let target = match tick {
            Some(t) => t,
            None => self.store.latest_tick(session_id).await?,
        };

        let (snapshot_tick, snapshot_json) = self
            .store
            .latest_snapshot_at_or_before(session_id, target)
            .await?
            .ok_or_else(|| EngineError::NoSnapshot {
                session: session_id.to_string(),
                tick: target,
            })?;

        self.config = session_config.config;
        self.applier = DeltaApplier::new(self.config.clone());

        let mut world = scenario::world_from_json(&snapshot_json)?;
        if snapshot_tick < target {
            for (_, delta_json) in self
                .store
                .deltas_in(session_id, snapshot_tick + 1, target)
                .await?
            {
                let delta: WorldDelta = serde_json::from_str(&delta_json)?;
                self.applier.apply(&delta, &mut world);
            }
        }

        info!(session = %session_id, tick = target, "loaded session");
        self.world = Some(world);
        self.session_id = Some(session_id.to_string());
        self.current_tick = target;
        self.seed = session_config.seed;
        Ok(())
    }

    /// Derived indices over the current world; empty before
    /// initialization.
    pub fn get_metrics(&self) -> MetricsReport {
        self.world
            .as_ref()
            .map(metrics::report)
            .unwrap_or_default()
    }
}

/// Per-tick RNG derived from the session seed, so that a session resumed
/// at tick N draws exactly what the original run drew at tick N.
fn tick_rng(seed: u64, tick: i64) -> SmallRng {
    SmallRng::seed_from_u64(seed ^ (tick as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

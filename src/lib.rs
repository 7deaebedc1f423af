pub mod config;
pub mod db;
pub mod delta;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod model;
pub mod scenario;
pub mod sim;
pub mod testutil;

pub use config::SimConfig;
pub use db::{SessionMeta, SessionStore};
pub use delta::{
    ApplyResult, DeltaApplier, DeltaBuilder, DeltaValidator, FactionCreation, FactionDelta,
    RegionCreation, RegionDelta, Severity, ValidationError, WorldDelta,
};
pub use engine::{SessionConfig, SimulationEngine};
pub use error::EngineError;
pub use metrics::MetricsReport;
pub use model::{Environment, Faction, Power, Region, Resources, SocioEconomic, Trait, World};
pub use sim::{Subsystem, TickContext, default_pipeline};

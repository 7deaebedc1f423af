use rand::RngCore;

use crate::config::SimConfig;
use crate::delta::DeltaBuilder;
use crate::model::World;

/// Per-tick context handed to each subsystem.
///
/// Bundled so fields can be added later without changing the `Subsystem`
/// trait signature. The RNG is the engine's seeded per-tick generator;
/// every probabilistic decision must draw from it.
pub struct TickContext<'a> {
    pub config: &'a SimConfig,
    pub rng: &'a mut dyn RngCore,
}

/// A rule subsystem: a pure function from the pre-tick world to a set of
/// proposed mutations.
///
/// Object-safe so the engine can hold the pipeline as an ordered
/// `Vec<Box<dyn Subsystem>>`. Implementations read `world` and
/// `ctx.config` only and write exclusively through `builder`; they never
/// fail; anything questionable is left for the validator and applier to
/// reject or clamp.
pub trait Subsystem {
    fn name(&self) -> &'static str;
    fn compute_delta(&self, world: &World, builder: &mut DeltaBuilder, ctx: &mut TickContext);
}

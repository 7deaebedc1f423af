use crate::delta::DeltaBuilder;
use crate::model::{Trait, World};

use super::system::{Subsystem, TickContext};

/// Influence is converted into knowledge once a faction can afford the
/// diplomatic overhead. Knowledge itself pays off in the metrics layer
/// (composite power) rather than here.
pub struct ResearchSystem;

impl Subsystem for ResearchSystem {
    fn name(&self) -> &'static str {
        "research"
    }

    fn compute_delta(&self, world: &World, builder: &mut DeltaBuilder, ctx: &mut TickContext) {
        let cfg = &ctx.config.research;
        let traits = &ctx.config.traits;

        for (faction_id, faction) in &world.factions {
            if !faction.is_active {
                continue;
            }
            if faction.resources.influence <= cfg.influence_threshold {
                continue;
            }

            let mut gain = cfg.knowledge_gain;
            if faction.has_trait(Trait::Technocrat) {
                gain *= traits.technocrat_research;
            }

            let mut new_resources = faction.resources;
            new_resources.influence -= cfg.influence_cost;

            builder
                .for_faction(faction_id)
                .set_resources(new_resources)
                .set_knowledge(faction.knowledge + gain);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::model::Faction;
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
        ResearchSystem.compute_delta(world, &mut builder, &mut ctx);
        builder.build()
    }

    fn faction_with_influence(influence: f64) -> World {
        let mut world = World::new();
        let mut f = Faction::new("f1", "One");
        f.resources.influence = influence;
        f.knowledge = 3.0;
        world.factions.insert("f1".to_string(), f);
        world
    }

    #[test]
    fn influence_converts_to_knowledge() {
        let delta = run(&faction_with_influence(20.0));
        let fd = &delta.faction_deltas["f1"];
        assert_eq!(fd.resources.unwrap().influence, 18.0);
        assert_eq!(fd.knowledge, Some(4.0));
    }

    #[test]
    fn poor_factions_do_not_research() {
        assert!(run(&faction_with_influence(10.0)).is_empty());
        assert!(run(&faction_with_influence(5.0)).is_empty());
    }

    #[test]
    fn technocrats_learn_faster() {
        let mut world = faction_with_influence(20.0);
        world
            .factions
            .get_mut("f1")
            .unwrap()
            .traits
            .insert(Trait::Technocrat);
        let delta = run(&world);
        assert_eq!(delta.faction_deltas["f1"].knowledge, Some(3.0 + 1.25));
    }
}

use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::delta::DeltaBuilder;
use crate::model::{Faction, Trait, World};

use super::system::{Subsystem, TickContext};

/// Random alliance formation between active factions and decay of
/// existing pacts. Both endpoints are always written together so the
/// alliance relation stays symmetric.
pub struct AllianceSystem;

impl Subsystem for AllianceSystem {
    fn name(&self) -> &'static str {
        "alliance"
    }

    fn compute_delta(&self, world: &World, builder: &mut DeltaBuilder, ctx: &mut TickContext) {
        let cfg = &ctx.config.alliance;
        let traits = &ctx.config.traits;
        let max_alliances = ctx.config.faction.max_alliances;

        let active: Vec<&Faction> = world.factions.values().filter(|f| f.is_active).collect();
        if active.len() < 2 {
            return;
        }

        let first = active.choose(ctx.rng).copied();
        if let Some(first) = first {
            let mut formation_chance = cfg.formation_chance;
            if first.has_trait(Trait::Diplomat) {
                formation_chance *= traits.diplomat_alliance_formation;
            }
            if ctx.rng.random_range(0.0..1.0) < formation_chance {
                if let Some(second) = active.choose(ctx.rng).copied() {
                    let already_allied = first.alliances.contains(&second.id);
                    let below_cap = first.alliances.len() < max_alliances
                        && second.alliances.len() < max_alliances;
                    if first.id != second.id && !already_allied && below_cap {
                        builder.for_faction(&first.id).add_alliance(&second.id);
                        builder.for_faction(&second.id).add_alliance(&first.id);
                        builder.add_event(format!(
                            "ALLIANCE: {} and {} formed an alliance.",
                            first.name, second.name
                        ));
                    }
                }
            }
        }

        // Each existing edge gets exactly one break roll per tick.
        let mut edges: BTreeSet<(&str, &str)> = BTreeSet::new();
        for faction in &active {
            for ally_id in &faction.alliances {
                let (a, b) = if faction.id.as_str() <= ally_id.as_str() {
                    (faction.id.as_str(), ally_id.as_str())
                } else {
                    (ally_id.as_str(), faction.id.as_str())
                };
                edges.insert((a, b));
            }
        }

        for (a, b) in edges {
            if ctx.rng.random_range(0.0..1.0) < cfg.break_chance {
                builder.for_faction(a).remove_alliance(b);
                builder.for_faction(b).remove_alliance(a);
                let name = |id: &str| {
                    world
                        .get_faction(id)
                        .map(|f| f.name.clone())
                        .unwrap_or_else(|| id.to_string())
                };
                builder.add_event(format!(
                    "ALLIANCE BROKEN: {} and {} are no longer allies.",
                    name(a),
                    name(b)
                ));
            }
        }
    }
}

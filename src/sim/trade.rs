use crate::delta::DeltaBuilder;
use crate::model::{Faction, World};

use super::system::{Subsystem, TickContext};

/// Allied factions balance food and energy: a surplus holder ships a
/// fixed amount to an ally in shortage, and both sides pocket credits and
/// a little legitimacy for the goodwill.
pub struct TradeSystem;

impl Subsystem for TradeSystem {
    fn name(&self) -> &'static str {
        "trade"
    }

    fn compute_delta(&self, world: &World, builder: &mut DeltaBuilder, ctx: &mut TickContext) {
        let factions: Vec<&Faction> = world.factions.values().collect();

        for i in 0..factions.len() {
            for j in (i + 1)..factions.len() {
                let f1 = factions[i];
                let f2 = factions[j];
                if !f1.is_active || !f2.is_active {
                    continue;
                }
                if !f2.alliances.contains(&f1.id) {
                    continue;
                }
                process_trade(f1, f2, builder, ctx);
            }
        }
    }
}

fn process_trade(f1: &Faction, f2: &Faction, builder: &mut DeltaBuilder, ctx: &mut TickContext) {
    let cfg = &ctx.config.trade;
    let max_legitimacy = ctx.config.faction.max_legitimacy;

    let mut res1 = f1.resources;
    let mut res2 = f2.resources;
    let mut traded = false;

    // Energy, then food, whichever side holds the surplus.
    if res1.energy > cfg.surplus_threshold && res2.energy < cfg.shortage_threshold {
        res1.energy -= cfg.transfer_amount;
        res2.energy += cfg.transfer_amount;
        traded = true;
    } else if res2.energy > cfg.surplus_threshold && res1.energy < cfg.shortage_threshold {
        res2.energy -= cfg.transfer_amount;
        res1.energy += cfg.transfer_amount;
        traded = true;
    }

    if res1.food > cfg.surplus_threshold && res2.food < cfg.shortage_threshold {
        res1.food -= cfg.transfer_amount;
        res2.food += cfg.transfer_amount;
        traded = true;
    } else if res2.food > cfg.surplus_threshold && res1.food < cfg.shortage_threshold {
        res2.food -= cfg.transfer_amount;
        res1.food += cfg.transfer_amount;
        traded = true;
    }

    if !traded {
        return;
    }

    res1.credits += cfg.credit_bonus;
    res2.credits += cfg.credit_bonus;

    builder
        .for_faction(&f1.id)
        .set_resources(res1)
        .set_legitimacy((f1.legitimacy + cfg.legitimacy_bonus).min(max_legitimacy));
    builder
        .for_faction(&f2.id)
        .set_resources(res2)
        .set_legitimacy((f2.legitimacy + cfg.legitimacy_bonus).min(max_legitimacy));
    builder.add_event(format!(
        "TRADE: supply convoys run between {} and {}.",
        f1.name, f2.name
    ));
}

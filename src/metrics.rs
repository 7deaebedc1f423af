//! Derived geopolitical indices over a [`World`]. Everything here is a
//! pure read; calling it twice on the same world yields equal reports.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Environment, Faction, World};

/// Classical Gini coefficient over a set of non-negative values.
/// Returns 0 for fewer than two values or a zero sum.
pub fn gini(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let sum: f64 = values.iter().sum();
    if sum <= 0.0 {
        return 0.0;
    }
    let mut diff_sum = 0.0;
    for x in values {
        for y in values {
            diff_sum += (x - y).abs();
        }
    }
    diff_sum / (2.0 * n as f64 * sum)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorldMetrics {
    pub total_power: f64,
    /// Herfindahl-Hirschman index of power shares: 1/n (balance) to 1
    /// (total hegemony).
    pub hegemony_hhi: f64,
    pub power_gini: f64,
    pub global_tension: f64,
    pub avg_legitimacy: f64,
    pub avg_infrastructure: f64,
    pub global_knowledge: f64,
    /// Alliance edges per active faction.
    pub alliance_density: f64,
    pub food_security_index: f64,
    pub energy_security_index: f64,
    /// Fraction of active factions with no alliances at all.
    pub diplomatic_fragmentation: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FactionMetrics {
    pub composite_power_index: f64,
    /// Entropy of the population distribution across owned regions.
    pub strategic_depth_index: f64,
    pub economic_intensity: f64,
    /// Legitimacy minus average regional cohesion.
    pub support_gap: f64,
    pub total_population: i64,
    pub urbanization_rate: f64,
    pub military_balance_ratio: f64,
    pub food_security_pct: f64,
    pub energy_security_pct: f64,
    pub diplomatic_influence: f64,
    pub threat_level: f64,
    pub tech_advantage: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetricsReport {
    /// `None` when the world has no active factions to aggregate.
    pub world: Option<WorldMetrics>,
    pub factions: BTreeMap<String, FactionMetrics>,
}

pub fn report(world: &World) -> MetricsReport {
    MetricsReport {
        world: world_metrics(world),
        factions: world
            .factions
            .iter()
            .filter(|(_, f)| f.is_active)
            .map(|(id, f)| (id.clone(), faction_metrics(world, f)))
            .collect(),
    }
}

pub fn world_metrics(world: &World) -> Option<WorldMetrics> {
    let factions: Vec<&Faction> = world.factions.values().filter(|f| f.is_active).collect();
    if factions.is_empty() {
        return None;
    }
    let n = factions.len() as f64;

    let total_power: f64 = factions.iter().map(|f| f.power.total()).sum();
    let hhi = if total_power > 0.0 {
        factions
            .iter()
            .map(|f| {
                let share = f.power.total() / total_power;
                share * share
            })
            .sum()
    } else {
        0.0
    };

    let powers: Vec<f64> = factions.iter().map(|f| f.power.total()).collect();
    let power_gini = gini(&powers);

    let avg_legitimacy = factions.iter().map(|f| f.legitimacy).sum::<f64>() / n;
    let tension = (100.0 - avg_legitimacy) * hhi * 10.0;

    let avg_infrastructure = if world.regions.is_empty() {
        0.0
    } else {
        world
            .regions
            .values()
            .map(|r| r.socio_economic.infrastructure)
            .sum::<f64>()
            / world.regions.len() as f64
    };
    let global_knowledge = factions.iter().map(|f| f.knowledge).sum::<f64>() / n;

    let alliance_edges = factions.iter().map(|f| f.alliances.len()).sum::<usize>() as f64 / 2.0;
    let alliance_density = alliance_edges / n;

    let total_food: f64 = factions.iter().map(|f| f.resources.food).sum();
    let total_energy: f64 = factions.iter().map(|f| f.resources.energy).sum();
    let total_population: i64 = factions
        .iter()
        .flat_map(|f| f.regions.iter())
        .filter_map(|rid| world.get_region(rid))
        .map(|r| r.population)
        .sum();
    let food_security = total_food / (total_population as f64 * 0.01 + 1.0) * 10.0;
    let energy_security = total_energy / (total_power * 0.1 + 1.0) * 10.0;

    let isolated = factions.iter().filter(|f| f.alliances.is_empty()).count() as f64;

    Some(WorldMetrics {
        total_power,
        hegemony_hhi: hhi,
        power_gini,
        global_tension: tension,
        avg_legitimacy,
        avg_infrastructure,
        global_knowledge,
        alliance_density,
        food_security_index: food_security,
        energy_security_index: energy_security,
        diplomatic_fragmentation: isolated / n,
    })
}

pub fn faction_metrics(world: &World, faction: &Faction) -> FactionMetrics {
    let cpi = faction.power.total() * (1.0 + faction.knowledge / 100.0);

    let region_pops: Vec<i64> = faction
        .regions
        .iter()
        .filter_map(|rid| world.get_region(rid))
        .map(|r| r.population)
        .collect();
    let total_population: i64 = region_pops.iter().sum();

    let strategic_depth = if region_pops.len() > 1 && total_population > 0 {
        region_pops
            .iter()
            .filter(|&&p| p > 0)
            .map(|&p| {
                let share = p as f64 / total_population as f64;
                -share * share.ln()
            })
            .sum()
    } else {
        0.0
    };

    let res = &faction.resources;
    let wealth = res.credits + res.materials + res.food + res.energy;
    let economic_intensity = wealth / (total_population as f64 + 1.0);

    let support_gap = faction.legitimacy - avg_cohesion(world, faction);

    let others: Vec<&Faction> = world
        .factions
        .values()
        .filter(|f| f.is_active && f.id != faction.id)
        .collect();
    let avg_other_power = if others.is_empty() {
        0.0
    } else {
        others.iter().map(|f| f.power.total()).sum::<f64>() / others.len() as f64
    };
    let military_balance = faction.power.total() / (avg_other_power + 0.1);

    let food_req = total_population as f64 * 0.01;
    let energy_req = faction.power.total() * 0.1;
    let food_security = res.food / (food_req + 1.0) * 100.0;
    let energy_security = res.energy / (energy_req + 1.0) * 100.0;

    let ally_power: f64 = faction
        .alliances
        .iter()
        .filter_map(|aid| world.get_faction(aid))
        .filter(|a| a.is_active)
        .map(|a| a.power.total())
        .sum();
    let diplomatic_influence = faction.alliances.len() as f64 * 10.0 + ally_power / 10.0;

    let threat_level: f64 = others
        .iter()
        .filter(|o| !o.alliances.contains(&faction.id))
        .filter(|o| o.power.total() > faction.power.total())
        .map(|o| (o.power.total() - faction.power.total()) / 10.0)
        .sum();

    let active: Vec<&Faction> = world.factions.values().filter(|f| f.is_active).collect();
    let avg_knowledge = if active.is_empty() {
        0.0
    } else {
        active.iter().map(|f| f.knowledge).sum::<f64>() / active.len() as f64
    };

    FactionMetrics {
        composite_power_index: cpi,
        strategic_depth_index: strategic_depth,
        economic_intensity,
        support_gap,
        total_population,
        urbanization_rate: urbanization_rate(world, faction),
        military_balance_ratio: military_balance,
        food_security_pct: food_security,
        energy_security_pct: energy_security,
        diplomatic_influence,
        threat_level,
        tech_advantage: faction.knowledge - avg_knowledge,
    }
}

fn avg_cohesion(world: &World, faction: &Faction) -> f64 {
    let cohesions: Vec<f64> = faction
        .regions
        .iter()
        .filter_map(|rid| world.get_region(rid))
        .map(|r| r.socio_economic.cohesion)
        .collect();
    if cohesions.is_empty() {
        0.0
    } else {
        cohesions.iter().sum::<f64>() / cohesions.len() as f64
    }
}

fn urbanization_rate(world: &World, faction: &Faction) -> f64 {
    let mut urban_pop = 0i64;
    let mut total_pop = 0i64;
    for region in faction.regions.iter().filter_map(|rid| world.get_region(rid)) {
        total_pop += region.population;
        if region.environment == Environment::Urban {
            urban_pop += region.population;
        }
    }
    if total_pop == 0 {
        0.0
    } else {
        urban_pop as f64 / total_pop as f64 * 100.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PowerRanking {
    pub id: String,
    pub name: String,
    pub composite_power: f64,
    pub raw_power: f64,
    pub knowledge: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EconomicRanking {
    pub id: String,
    pub name: String,
    pub total_wealth: f64,
    pub credits: f64,
    pub materials: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StabilityRanking {
    pub id: String,
    pub name: String,
    pub stability_score: f64,
    pub legitimacy: f64,
    pub avg_cohesion: f64,
}

/// Active factions ranked by composite power, strongest first.
pub fn power_rankings(world: &World) -> Vec<PowerRanking> {
    let mut rankings: Vec<PowerRanking> = world
        .factions
        .values()
        .filter(|f| f.is_active)
        .map(|f| PowerRanking {
            id: f.id.clone(),
            name: f.name.clone(),
            composite_power: f.power.total() * (1.0 + f.knowledge / 100.0),
            raw_power: f.power.total(),
            knowledge: f.knowledge,
        })
        .collect();
    sort_descending(&mut rankings, |r| r.composite_power, |r| &r.id);
    rankings
}

/// Active factions ranked by total held resources, richest first.
pub fn economic_rankings(world: &World) -> Vec<EconomicRanking> {
    let mut rankings: Vec<EconomicRanking> = world
        .factions
        .values()
        .filter(|f| f.is_active)
        .map(|f| {
            let r = &f.resources;
            EconomicRanking {
                id: f.id.clone(),
                name: f.name.clone(),
                total_wealth: r.credits + r.materials + r.food + r.energy,
                credits: r.credits,
                materials: r.materials,
            }
        })
        .collect();
    sort_descending(&mut rankings, |r| r.total_wealth, |r| &r.id);
    rankings
}

/// Active factions ranked by `(legitimacy + avg cohesion) / 2`.
pub fn stability_rankings(world: &World) -> Vec<StabilityRanking> {
    let mut rankings: Vec<StabilityRanking> = world
        .factions
        .values()
        .filter(|f| f.is_active)
        .map(|f| {
            let cohesion = avg_cohesion(world, f);
            StabilityRanking {
                id: f.id.clone(),
                name: f.name.clone(),
                stability_score: (f.legitimacy + cohesion) / 2.0,
                legitimacy: f.legitimacy,
                avg_cohesion: cohesion,
            }
        })
        .collect();
    sort_descending(&mut rankings, |r| r.stability_score, |r| &r.id);
    rankings
}

/// Sort by score descending with the id as a deterministic tie-break.
fn sort_descending<T>(items: &mut [T], score: impl Fn(&T) -> f64, id: impl Fn(&T) -> &str) {
    items.sort_by(|a, b| {
        score(b)
            .partial_cmp(&score(a))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| id(a).cmp(id(b)))
    });
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FactionComparison {
    pub id: String,
    pub name: String,
    pub metrics: FactionMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comparison {
    pub faction_1: FactionComparison,
    pub faction_2: FactionComparison,
    pub power_ratio: f64,
    pub wealth_ratio: f64,
    pub are_allied: bool,
}

/// Side-by-side comparison of two factions, or `None` if either id is
/// unknown.
pub fn compare(world: &World, first_id: &str, second_id: &str) -> Option<Comparison> {
    let f1 = world.get_faction(first_id)?;
    let f2 = world.get_faction(second_id)?;
    Some(Comparison {
        faction_1: FactionComparison {
            id: f1.id.clone(),
            name: f1.name.clone(),
            metrics: faction_metrics(world, f1),
        },
        faction_2: FactionComparison {
            id: f2.id.clone(),
            name: f2.name.clone(),
            metrics: faction_metrics(world, f2),
        },
        power_ratio: f1.power.total() / (f2.power.total() + 0.1),
        wealth_ratio: (f1.resources.credits + f1.resources.materials)
            / (f2.resources.credits + f2.resources.materials + 0.1),
        are_allied: f2.alliances.contains(&f1.id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Power, Region, SocioEconomic};

    fn faction(id: &str, power: f64, legitimacy: f64) -> Faction {
        let mut f = Faction::new(id, id);
        f.power = Power::new(power, 0.0, 0.0);
        f.legitimacy = legitimacy;
        f
    }

    fn three_faction_world() -> World {
        let mut world = World::new();
        world.factions.insert("f1".to_string(), faction("f1", 60.0, 40.0));
        world.factions.insert("f2".to_string(), faction("f2", 30.0, 60.0));
        world.factions.insert("f3".to_string(), faction("f3", 10.0, 80.0));
        for (rid, pop, env) in [
            ("r1", 5000, Environment::Urban),
            ("r2", 2000, Environment::Rural),
        ] {
            world.regions.insert(
                rid.to_string(),
                Region {
                    id: rid.to_string(),
                    name: rid.to_string(),
                    population: pop,
                    owner: None,
                    environment: env,
                    socio_economic: SocioEconomic::default(),
                },
            );
        }
        world.set_region_owner("r1", Some("f1"));
        world.set_region_owner("r2", Some("f1"));
        world
    }

    #[test]
    fn gini_bounds() {
        assert_eq!(gini(&[]), 0.0);
        assert_eq!(gini(&[50.0]), 0.0);
        assert_eq!(gini(&[50.0, 50.0]), 0.0);
        let g = gini(&[0.0, 0.0, 0.0, 100.0]);
        assert!(g > 0.0 && g <= 1.0);
        assert!((gini(&[10.0, 90.0]) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn hhi_within_theoretical_bounds() {
        let world = three_faction_world();
        let m = world_metrics(&world).unwrap();
        let n = 3.0;
        assert!(m.hegemony_hhi >= 1.0 / n - 1e-12);
        assert!(m.hegemony_hhi <= 1.0 + 1e-12);
    }

    #[test]
    fn report_is_idempotent() {
        let world = three_faction_world();
        assert_eq!(report(&world), report(&world));
    }

    #[test]
    fn empty_world_has_no_world_metrics() {
        let report = report(&World::new());
        assert!(report.world.is_none());
        assert!(report.factions.is_empty());
    }

    #[test]
    fn urbanization_counts_urban_population() {
        let world = three_faction_world();
        let m = faction_metrics(&world, &world.factions["f1"]);
        assert!((m.urbanization_rate - 5000.0 / 7000.0 * 100.0).abs() < 1e-9);
        assert_eq!(m.total_population, 7000);
    }

    #[test]
    fn threat_level_counts_stronger_rivals_only() {
        let world = three_faction_world();
        let weakest = faction_metrics(&world, &world.factions["f3"]);
        let expected = ((60.0 - 10.0) + (30.0 - 10.0)) / 10.0;
        assert!((weakest.threat_level - expected).abs() < 1e-9);
        let strongest = faction_metrics(&world, &world.factions["f1"]);
        assert_eq!(strongest.threat_level, 0.0);
    }

    #[test]
    fn rankings_sorted_descending() {
        let world = three_faction_world();
        let power = power_rankings(&world);
        assert_eq!(power[0].id, "f1");
        assert_eq!(power[2].id, "f3");
        let stability = stability_rankings(&world);
        assert_eq!(stability.len(), 3);
        assert!(stability[0].stability_score >= stability[1].stability_score);
    }

    #[test]
    fn compare_reports_alliance_state() {
        let mut world = three_faction_world();
        let c = compare(&world, "f1", "f2").unwrap();
        assert!(!c.are_allied);
        assert!((c.power_ratio - 60.0 / 30.1).abs() < 1e-9);

        world
            .factions
            .get_mut("f1")
            .unwrap()
            .alliances
            .insert("f2".to_string());
        world
            .factions
            .get_mut("f2")
            .unwrap()
            .alliances
            .insert("f1".to_string());
        assert!(compare(&world, "f1", "f2").unwrap().are_allied);
        assert!(compare(&world, "f1", "ghost").is_none());
    }
}

use serde::{Deserialize, Serialize};

/// Frozen tuning block for the whole simulation. Constructed once per
/// session via `Default`, persisted with the session row, and passed to
/// subsystems by shared reference. Nothing mutates it after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    pub simulation: SimulationConfig,
    pub faction: FactionBounds,
    pub power: PowerConfig,
    pub economy: EconomyConfig,
    pub legitimacy: LegitimacyConfig,
    pub alliance: AllianceConfig,
    pub war: WarConfig,
    pub research: ResearchConfig,
    pub trade: TradeConfig,
    pub investment: InvestmentConfig,
    pub region: RegionConfig,
    pub conflict: ConflictConfig,
    pub collapse: CollapseConfig,
    pub traits: TraitModifiers,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            faction: FactionBounds::default(),
            power: PowerConfig::default(),
            economy: EconomyConfig::default(),
            legitimacy: LegitimacyConfig::default(),
            alliance: AllianceConfig::default(),
            war: WarConfig::default(),
            research: ResearchConfig::default(),
            trade: TradeConfig::default(),
            investment: InvestmentConfig::default(),
            region: RegionConfig::default(),
            conflict: ConflictConfig::default(),
            collapse: CollapseConfig::default(),
            traits: TraitModifiers::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// A world snapshot is persisted every this many ticks (tick 0 always).
    pub snapshot_interval: i64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            snapshot_interval: 10,
        }
    }
}

/// Hard bounds on faction scalars, enforced by the validator and the
/// applier's final clamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FactionBounds {
    pub min_branch_power: f64,
    pub max_branch_power: f64,
    pub min_legitimacy: f64,
    pub max_legitimacy: f64,
    /// Credits and materials may run negative down to this floor.
    pub debt_floor: f64,
    pub max_resources: f64,
    pub max_alliances: usize,
}

impl Default for FactionBounds {
    fn default() -> Self {
        Self {
            min_branch_power: 0.0,
            max_branch_power: 100.0,
            min_legitimacy: 0.0,
            max_legitimacy: 100.0,
            debt_floor: -10_000.0,
            max_resources: 100_000.0,
            max_alliances: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PowerConfig {
    pub army_growth: f64,
    pub navy_growth: f64,
    pub air_growth: f64,
    pub army_decay: f64,
    pub navy_decay: f64,
    pub air_decay: f64,
    /// Per-region power bonus, split across branches by the shares below.
    pub region_power_factor: f64,
    pub region_army_share: f64,
    pub region_navy_share: f64,
    pub region_air_share: f64,
    pub coastal_navy_bonus: f64,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            army_growth: 0.02,
            navy_growth: 0.015,
            air_growth: 0.01,
            army_decay: 0.005,
            navy_decay: 0.003,
            air_decay: 0.008,
            region_power_factor: 0.2,
            region_army_share: 0.6,
            region_navy_share: 0.3,
            region_air_share: 0.1,
            coastal_navy_bonus: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EconomyConfig {
    pub base_credits_income: f64,
    pub base_materials_income: f64,
    pub base_food_income: f64,
    pub base_energy_income: f64,
    pub base_influence_income: f64,
    pub region_credits_factor: f64,
    pub region_materials_factor: f64,
    pub rural_food_yield: f64,
    pub coastal_food_yield: f64,
    pub industrial_materials_yield: f64,
    pub industrial_energy_yield: f64,
    pub urban_energy_drain: f64,
    pub food_per_population: f64,
    pub energy_per_power: f64,
    pub upkeep_power_factor: f64,
    pub corruption_factor: f64,
    /// Food and energy spoil by this fraction every tick.
    pub perishable_decay: f64,
    pub resource_starvation_threshold: f64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            base_credits_income: 10.0,
            base_materials_income: 5.0,
            base_food_income: 1.0,
            base_energy_income: 0.5,
            base_influence_income: 1.0,
            region_credits_factor: 2.0,
            region_materials_factor: 1.0,
            rural_food_yield: 1.0,
            coastal_food_yield: 0.5,
            industrial_materials_yield: 3.0,
            industrial_energy_yield: 2.0,
            urban_energy_drain: 0.5,
            food_per_population: 0.005,
            energy_per_power: 0.1,
            upkeep_power_factor: 0.2,
            corruption_factor: 0.02,
            perishable_decay: 0.02,
            resource_starvation_threshold: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LegitimacyConfig {
    pub base_decay: f64,
    pub cohesion_factor: f64,
    pub inequality_penalty: f64,
    pub starvation_loss: f64,
    pub alliance_bonus: f64,
    pub expansion_penalty_factor: f64,
    pub stagnation_penalty: f64,
    pub military_victory_bonus: f64,
    pub revolution_threshold: f64,
    pub revolution_chance: f64,
}

impl Default for LegitimacyConfig {
    fn default() -> Self {
        Self {
            base_decay: 0.01,
            cohesion_factor: 0.3,
            inequality_penalty: 0.4,
            starvation_loss: 2.0,
            alliance_bonus: 2.0,
            expansion_penalty_factor: 0.5,
            stagnation_penalty: 1.0,
            military_victory_bonus: 5.0,
            revolution_threshold: 25.0,
            revolution_chance: 0.15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AllianceConfig {
    pub formation_chance: f64,
    pub break_chance: f64,
}

impl Default for AllianceConfig {
    fn default() -> Self {
        Self {
            formation_chance: 0.05,
            break_chance: 0.02,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WarConfig {
    pub declaration_chance: f64,
    /// When rival targets exist, a draw below this still diverts the
    /// attacker toward colonization instead.
    pub colonization_chance: f64,
    pub victory_power_ratio_threshold: f64,
    pub victory_chance_factor: f64,
    pub victory_cap: f64,
    pub conquest_stability: f64,
    pub conquest_materials_cost: f64,
    pub conquest_attacker_power_remaining: f64,
    pub failed_attack_attacker_power_remaining: f64,
    pub failed_attack_defender_power_remaining: f64,
    pub colonization_stability: f64,
    pub colonization_army_cost: f64,
}

impl Default for WarConfig {
    fn default() -> Self {
        Self {
            declaration_chance: 0.05,
            colonization_chance: 0.2,
            victory_power_ratio_threshold: 1.1,
            victory_chance_factor: 1.5,
            victory_cap: 0.9,
            conquest_stability: 30.0,
            conquest_materials_cost: 5.0,
            conquest_attacker_power_remaining: 0.95,
            failed_attack_attacker_power_remaining: 0.8,
            failed_attack_defender_power_remaining: 0.9,
            colonization_stability: 80.0,
            colonization_army_cost: 2.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResearchConfig {
    pub influence_threshold: f64,
    pub influence_cost: f64,
    pub knowledge_gain: f64,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            influence_threshold: 10.0,
            influence_cost: 2.0,
            knowledge_gain: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TradeConfig {
    pub surplus_threshold: f64,
    pub shortage_threshold: f64,
    pub transfer_amount: f64,
    pub credit_bonus: f64,
    pub legitimacy_bonus: f64,
}

impl Default for TradeConfig {
    fn default() -> Self {
        Self {
            surplus_threshold: 50.0,
            shortage_threshold: 10.0,
            transfer_amount: 10.0,
            credit_bonus: 2.0,
            legitimacy_bonus: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InvestmentConfig {
    pub chance: f64,
    /// Share of investments aimed at stability; the rest buy infrastructure.
    pub stability_share: f64,
    pub stability_cost: f64,
    pub stability_gain: f64,
    pub infrastructure_cost: f64,
    pub infrastructure_gain: f64,
}

impl Default for InvestmentConfig {
    fn default() -> Self {
        Self {
            chance: 0.1,
            stability_share: 0.6,
            stability_cost: 10.0,
            stability_gain: 15.0,
            infrastructure_cost: 15.0,
            infrastructure_gain: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RegionConfig {
    pub max_population: i64,
    pub min_stability: f64,
    pub max_stability: f64,
    pub infrastructure_growth: f64,
    pub urban_infrastructure_mult: f64,
    pub wilderness_infrastructure_mult: f64,
    pub cohesion_recovery_base: f64,
    pub urban_growth_rate: f64,
    pub rural_growth_rate: f64,
    pub industrial_growth_rate: f64,
    pub coastal_growth_rate: f64,
    pub wilderness_growth_rate: f64,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            max_population: 10_000,
            min_stability: 0.0,
            max_stability: 100.0,
            infrastructure_growth: 0.1,
            urban_infrastructure_mult: 1.5,
            wilderness_infrastructure_mult: 0.5,
            cohesion_recovery_base: 0.2,
            urban_growth_rate: 0.005,
            rural_growth_rate: 0.003,
            industrial_growth_rate: 0.002,
            coastal_growth_rate: 0.004,
            wilderness_growth_rate: 0.001,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConflictConfig {
    pub insurrection_chance: f64,
    pub insurrection_army: f64,
    pub insurrection_legitimacy: f64,
    pub insurrection_credits: f64,
    /// Cohesion of a region after a successful insurrection:
    /// `revolt_stability_threshold + insurrection_stability_bonus`.
    pub insurrection_stability_bonus: f64,
    pub revolt_stability_threshold: f64,
    pub revolt_chance: f64,
    pub revolt_stability_loss: f64,
    pub revolt_power_loss: f64,
    pub revolt_army_share: f64,
    pub revolt_navy_share: f64,
    pub revolt_air_share: f64,
    pub revolution_power_remaining: f64,
    pub revolution_stability_penalty: f64,
    pub civil_war_chance: f64,
    pub civil_war_legitimacy_factor: f64,
    pub civil_war_rebel_power_ratio: f64,
    pub civil_war_parent_power_ratio: f64,
    pub civil_war_rebel_resource_ratio: f64,
    pub civil_war_rebel_legitimacy: f64,
    pub coup_chance: f64,
    pub coup_army_gain: f64,
    pub coup_navy_gain: f64,
    pub coup_air_gain: f64,
    pub coup_legitimacy_loss: f64,
    pub coup_stability_loss: f64,
}

impl Default for ConflictConfig {
    fn default() -> Self {
        Self {
            insurrection_chance: 0.05,
            insurrection_army: 15.0,
            insurrection_legitimacy: 60.0,
            insurrection_credits: 10.0,
            insurrection_stability_bonus: 20.0,
            revolt_stability_threshold: 20.0,
            revolt_chance: 0.30,
            revolt_stability_loss: 20.0,
            revolt_power_loss: 5.0,
            revolt_army_share: 0.6,
            revolt_navy_share: 0.3,
            revolt_air_share: 0.1,
            revolution_power_remaining: 0.8,
            revolution_stability_penalty: 20.0,
            civil_war_chance: 0.005,
            civil_war_legitimacy_factor: 0.1,
            civil_war_rebel_power_ratio: 0.4,
            civil_war_parent_power_ratio: 0.6,
            civil_war_rebel_resource_ratio: 0.5,
            civil_war_rebel_legitimacy: 50.0,
            coup_chance: 0.01,
            coup_army_gain: 10.0,
            coup_navy_gain: 5.0,
            coup_air_gain: 5.0,
            coup_legitimacy_loss: 30.0,
            coup_stability_loss: 15.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CollapseConfig {
    pub power_floor: f64,
    pub legitimacy_floor: f64,
}

impl Default for CollapseConfig {
    fn default() -> Self {
        Self {
            power_floor: 5.0,
            legitimacy_floor: 10.0,
        }
    }
}

/// Every trait modifier in one place. Each is applied at exactly one site
/// in one subsystem; no dispatch hooks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TraitModifiers {
    pub militarist_power_growth: f64,
    pub pacifist_power_growth: f64,
    pub industrialist_income: f64,
    pub militarist_upkeep: f64,
    pub technocrat_corruption: f64,
    pub autocrat_cohesion_impact: f64,
    pub populist_inequality_penalty: f64,
    pub diplomat_alliance_legitimacy: f64,
    pub imperialist_expansion_penalty: f64,
    pub pacifist_legitimacy: f64,
    pub diplomat_alliance_formation: f64,
    pub pacifist_war_declaration: f64,
    pub militarist_victory: f64,
    pub imperialist_conquest_cost: f64,
    pub imperialist_victory_legitimacy: f64,
    pub technocrat_research: f64,
    pub populist_revolution_threshold: f64,
    pub autocrat_coup_chance: f64,
}

impl Default for TraitModifiers {
    fn default() -> Self {
        Self {
            militarist_power_growth: 1.2,
            pacifist_power_growth: 0.8,
            industrialist_income: 1.25,
            militarist_upkeep: 0.9,
            technocrat_corruption: 0.5,
            autocrat_cohesion_impact: 0.5,
            populist_inequality_penalty: 0.5,
            diplomat_alliance_legitimacy: 1.5,
            imperialist_expansion_penalty: 0.8,
            pacifist_legitimacy: 1.1,
            diplomat_alliance_formation: 1.5,
            pacifist_war_declaration: 0.5,
            militarist_victory: 1.15,
            imperialist_conquest_cost: 0.7,
            imperialist_victory_legitimacy: 2.0,
            technocrat_research: 1.25,
            populist_revolution_threshold: 1.2,
            autocrat_coup_chance: 1.5,
        }
    }
}

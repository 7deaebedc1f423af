use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::SimConfig;
use crate::model::World;

use super::types::{FactionDelta, RegionDelta, WorldDelta};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// One finding from validating a delta against the current world.
/// Severity `Error` rejects the whole delta; warnings are logged and the
/// application proceeds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationError {
    pub severity: Severity,
    pub message: String,
    pub entity_id: String,
    pub field: String,
    pub value: Option<serde_json::Value>,
}

impl ValidationError {
    fn error(message: impl Into<String>, entity_id: &str, field: &str) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            entity_id: entity_id.to_string(),
            field: field.to_string(),
            value: None,
        }
    }

    fn warning(message: impl Into<String>, entity_id: &str, field: &str) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            entity_id: entity_id.to_string(),
            field: field.to_string(),
            value: None,
        }
    }

    fn with_value(mut self, value: serde_json::Value) -> Self {
        self.value = Some(value);
        self
    }
}

/// Pure check of a [`WorldDelta`] against a [`World`]: target existence,
/// scalar bounds, and cross-faction ownership conflicts.
#[derive(Debug, Clone)]
pub struct DeltaValidator {
    config: SimConfig,
}

impl DeltaValidator {
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    pub fn validate(&self, delta: &WorldDelta, world: &World) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for (faction_id, faction_delta) in &delta.faction_deltas {
            self.validate_faction_delta(faction_id, faction_delta, delta, world, &mut errors);
        }
        for (region_id, region_delta) in &delta.region_deltas {
            self.validate_region_delta(region_id, region_delta, delta, world, &mut errors);
        }
        self.validate_region_claims(delta, &mut errors);

        errors
    }

    fn validate_faction_delta(
        &self,
        faction_id: &str,
        fd: &FactionDelta,
        delta: &WorldDelta,
        world: &World,
        errors: &mut Vec<ValidationError>,
    ) {
        if world.get_faction(faction_id).is_none() {
            errors.push(ValidationError::error(
                format!("faction {faction_id} does not exist"),
                faction_id,
                "",
            ));
            return;
        }

        let bounds = &self.config.faction;
        if let Some(power) = &fd.power {
            for (branch, value) in [("army", power.army), ("navy", power.navy), ("air", power.air)]
            {
                if value < bounds.min_branch_power {
                    errors.push(
                        ValidationError::error(
                            format!("{branch} power below minimum"),
                            faction_id,
                            "power",
                        )
                        .with_value(json!(value)),
                    );
                } else if value > bounds.max_branch_power {
                    errors.push(
                        ValidationError::warning(
                            format!("{branch} power above maximum (will be clamped)"),
                            faction_id,
                            "power",
                        )
                        .with_value(json!(value)),
                    );
                }
            }
        }

        if let Some(legitimacy) = fd.legitimacy {
            if !(bounds.min_legitimacy..=bounds.max_legitimacy).contains(&legitimacy) {
                errors.push(
                    ValidationError::warning(
                        "legitimacy out of bounds (will be clamped)",
                        faction_id,
                        "legitimacy",
                    )
                    .with_value(json!(legitimacy)),
                );
            }
        }

        for region_id in &fd.add_regions {
            let exists =
                world.get_region(region_id).is_some() || delta.create_regions.contains_key(region_id);
            if !exists {
                errors.push(
                    ValidationError::error(
                        format!("region {region_id} does not exist"),
                        faction_id,
                        "add_regions",
                    )
                    .with_value(json!(region_id)),
                );
            }
        }

        for ally_id in &fd.add_alliances {
            let exists = world.get_faction(ally_id).is_some()
                || delta.create_factions.contains_key(ally_id);
            if !exists {
                errors.push(
                    ValidationError::error(
                        format!("allied faction {ally_id} does not exist"),
                        faction_id,
                        "add_alliances",
                    )
                    .with_value(json!(ally_id)),
                );
            }
        }
    }

    fn validate_region_delta(
        &self,
        region_id: &str,
        rd: &RegionDelta,
        delta: &WorldDelta,
        world: &World,
        errors: &mut Vec<ValidationError>,
    ) {
        let exists =
            world.get_region(region_id).is_some() || delta.create_regions.contains_key(region_id);
        if !exists {
            errors.push(ValidationError::error(
                format!("region {region_id} does not exist"),
                region_id,
                "",
            ));
            return;
        }

        let region_cfg = &self.config.region;
        if let Some(stability) = rd.stability {
            if !(region_cfg.min_stability..=region_cfg.max_stability).contains(&stability) {
                errors.push(
                    ValidationError::warning(
                        "stability out of bounds (will be clamped)",
                        region_id,
                        "stability",
                    )
                    .with_value(json!(stability)),
                );
            }
        }
        if let Some(se) = &rd.socio_economic {
            if !(0.0..=100.0).contains(&se.cohesion) {
                errors.push(
                    ValidationError::warning(
                        "cohesion out of bounds (will be clamped)",
                        region_id,
                        "socio_economic",
                    )
                    .with_value(json!(se.cohesion)),
                );
            }
        }

        // Empty string is the explicit "clear owner" marker.
        if let Some(owner) = rd.owner.as_deref() {
            if !owner.is_empty() {
                let known = world.get_faction(owner).is_some()
                    || delta.create_factions.contains_key(owner);
                if !known {
                    errors.push(
                        ValidationError::error(
                            format!("owner {owner} does not exist"),
                            region_id,
                            "owner",
                        )
                        .with_value(json!(owner)),
                    );
                }
            }
        }
    }

    /// No two factions may claim the same region via `add_regions` within
    /// a single delta.
    fn validate_region_claims(&self, delta: &WorldDelta, errors: &mut Vec<ValidationError>) {
        let mut claimed: std::collections::BTreeMap<&str, &str> = std::collections::BTreeMap::new();
        for (faction_id, fd) in &delta.faction_deltas {
            for region_id in &fd.add_regions {
                match claimed.get(region_id.as_str()) {
                    Some(other) => {
                        errors.push(
                            ValidationError::error(
                                format!(
                                    "conflict: {faction_id} and {other} both claim region {region_id}"
                                ),
                                faction_id,
                                "add_regions",
                            )
                            .with_value(json!(region_id)),
                        );
                    }
                    None => {
                        claimed.insert(region_id, faction_id);
                    }
                }
            }
        }
    }
}

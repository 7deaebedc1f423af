use serde::{Deserialize, Serialize};

/// Terrain and settlement character of a region. Drives economic yields,
/// population growth and a handful of military modifiers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Environment {
    Urban,
    Rural,
    Industrial,
    Coastal,
    Wilderness,
}

impl Environment {
    /// Scenario documents may carry arbitrary strings here; anything
    /// unrecognized falls back to Rural.
    pub fn from_name(name: &str) -> Environment {
        match name.to_ascii_uppercase().as_str() {
            "URBAN" => Environment::Urban,
            "INDUSTRIAL" => Environment::Industrial,
            "COASTAL" => Environment::Coastal,
            "WILDERNESS" => Environment::Wilderness,
            _ => Environment::Rural,
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Rural
    }
}

/// Regional development block: infrastructure and social cohesion, both
/// on a 0–100 scale. Cohesion doubles as the region's stability.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SocioEconomic {
    #[serde(default = "default_infrastructure")]
    pub infrastructure: f64,
    #[serde(default = "default_cohesion")]
    pub cohesion: f64,
}

fn default_infrastructure() -> f64 {
    20.0
}

fn default_cohesion() -> f64 {
    100.0
}

impl Default for SocioEconomic {
    fn default() -> Self {
        Self {
            infrastructure: default_infrastructure(),
            cohesion: default_cohesion(),
        }
    }
}

/// A territory owned by at most one faction. Regions are created only at
/// world initialization; they may change hands or fall unowned, but are
/// never destroyed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Region {
    pub id: String,
    pub name: String,
    pub population: i64,
    pub owner: Option<String>,
    pub environment: Environment,
    pub socio_economic: SocioEconomic,
}

impl Region {
    /// Alias kept for callers that think in terms of stability.
    pub fn stability(&self) -> f64 {
        self.socio_economic.cohesion
    }
}

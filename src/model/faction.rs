use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::power::Power;
use super::resources::Resources;

/// National character traits. A faction carries a small subset; each trait
/// is a numeric modifier applied at a fixed site in one subsystem.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Trait {
    Militarist,
    Pacifist,
    Industrialist,
    Technocrat,
    Populist,
    Diplomat,
    Imperialist,
    Autocrat,
}

impl Trait {
    pub const ALL: [Trait; 8] = [
        Trait::Militarist,
        Trait::Pacifist,
        Trait::Industrialist,
        Trait::Technocrat,
        Trait::Populist,
        Trait::Diplomat,
        Trait::Imperialist,
        Trait::Autocrat,
    ];

    /// Lenient parse used by scenario import. Unknown names are dropped
    /// rather than failing the whole document.
    pub fn from_name(name: &str) -> Option<Trait> {
        Trait::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Trait::Militarist => "Militarist",
            Trait::Pacifist => "Pacifist",
            Trait::Industrialist => "Industrialist",
            Trait::Technocrat => "Technocrat",
            Trait::Populist => "Populist",
            Trait::Diplomat => "Diplomat",
            Trait::Imperialist => "Imperialist",
            Trait::Autocrat => "Autocrat",
        }
    }
}

/// A polity: military power, an economy, political legitimacy, territory
/// and diplomatic ties.
///
/// `regions` is a derived index over `Region::owner`; the applier keeps
/// the two sides reconciled. A collapsed faction is deactivated, never
/// deleted, so its history stays addressable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Faction {
    pub id: String,
    pub name: String,
    pub power: Power,
    pub legitimacy: f64,
    pub resources: Resources,
    pub knowledge: f64,
    pub regions: BTreeSet<String>,
    pub alliances: BTreeSet<String>,
    pub traits: BTreeSet<Trait>,
    pub is_active: bool,
    pub color: String,
}

impl Faction {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            power: Power::default(),
            legitimacy: 50.0,
            resources: Resources::default(),
            knowledge: 0.0,
            regions: BTreeSet::new(),
            alliances: BTreeSet::new(),
            traits: BTreeSet::new(),
            is_active: true,
            color: "#808080".to_string(),
        }
    }

    pub fn has_trait(&self, t: Trait) -> bool {
        self.traits.contains(&t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trait_names_round_trip() {
        for t in Trait::ALL {
            assert_eq!(Trait::from_name(t.name()), Some(t));
        }
        assert_eq!(Trait::from_name("militarist"), Some(Trait::Militarist));
        assert_eq!(Trait::from_name("Warlike"), None);
    }

    #[test]
    fn trait_serializes_by_variant_name() {
        assert_eq!(
            serde_json::to_string(&Trait::Technocrat).unwrap(),
            "\"Technocrat\""
        );
    }

    #[test]
    fn new_faction_defaults() {
        let f = Faction::new("f1", "Test");
        assert!(f.is_active);
        assert_eq!(f.legitimacy, 50.0);
        assert!(f.regions.is_empty());
        assert!(f.alliances.is_empty());
    }
}

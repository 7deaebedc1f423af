use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// Military strength split across three branches.
///
/// Subtraction saturates at zero per branch: a faction can lose at most
/// what it has. Addition and scaling are unbounded; callers clamp with
/// [`Power::clamp`] where a ceiling applies.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Power {
    #[serde(default)]
    pub army: f64,
    #[serde(default)]
    pub navy: f64,
    #[serde(default)]
    pub air: f64,
}

impl Power {
    pub fn new(army: f64, navy: f64, air: f64) -> Self {
        Self { army, navy, air }
    }

    pub fn total(&self) -> f64 {
        self.army + self.navy + self.air
    }

    /// Clamp each branch independently to `[min, max]`.
    pub fn clamp(&self, min: f64, max: f64) -> Self {
        Self {
            army: self.army.clamp(min, max),
            navy: self.navy.clamp(min, max),
            air: self.air.clamp(min, max),
        }
    }
}

impl Add for Power {
    type Output = Power;

    fn add(self, other: Power) -> Power {
        Power {
            army: self.army + other.army,
            navy: self.navy + other.navy,
            air: self.air + other.air,
        }
    }
}

impl Sub for Power {
    type Output = Power;

    fn sub(self, other: Power) -> Power {
        Power {
            army: (self.army - other.army).max(0.0),
            navy: (self.navy - other.navy).max(0.0),
            air: (self.air - other.air).max(0.0),
        }
    }
}

impl Mul<f64> for Power {
    type Output = Power;

    fn mul(self, factor: f64) -> Power {
        Power {
            army: self.army * factor,
            navy: self.navy * factor,
            air: self.air * factor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_sums_branches() {
        let p = Power::new(60.0, 30.0, 20.0);
        assert_eq!(p.total(), 110.0);
    }

    #[test]
    fn sub_saturates_at_zero() {
        let p = Power::new(5.0, 0.0, 1.0) - Power::new(10.0, 1.0, 0.5);
        assert_eq!(p.army, 0.0);
        assert_eq!(p.navy, 0.0);
        assert_eq!(p.air, 0.5);
    }

    #[test]
    fn clamp_bounds_each_branch() {
        let p = Power::new(150.0, -3.0, 40.0).clamp(0.0, 100.0);
        assert_eq!(p.army, 100.0);
        assert_eq!(p.navy, 0.0);
        assert_eq!(p.air, 40.0);
    }

    #[test]
    fn missing_fields_default_to_zero() {
        let p: Power = serde_json::from_str(r#"{"army": 15.0}"#).unwrap();
        assert_eq!(p.army, 15.0);
        assert_eq!(p.navy, 0.0);
        assert_eq!(p.air, 0.0);
    }
}

use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// The resource quintuple held by a faction.
///
/// Credits and materials may run negative down to the debt floor enforced
/// by the economy subsystem; food and energy are clamped at zero when
/// consumed past empty.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Resources {
    #[serde(default)]
    pub credits: f64,
    #[serde(default)]
    pub materials: f64,
    #[serde(default)]
    pub food: f64,
    #[serde(default)]
    pub energy: f64,
    #[serde(default)]
    pub influence: f64,
}

impl Resources {
    pub fn clamp(&self, min: f64, max: f64) -> Self {
        Self {
            credits: self.credits.clamp(min, max),
            materials: self.materials.clamp(min, max),
            food: self.food.clamp(min, max),
            energy: self.energy.clamp(min, max),
            influence: self.influence.clamp(min, max),
        }
    }
}

impl Add for Resources {
    type Output = Resources;

    fn add(self, other: Resources) -> Resources {
        Resources {
            credits: self.credits + other.credits,
            materials: self.materials + other.materials,
            food: self.food + other.food,
            energy: self.energy + other.energy,
            influence: self.influence + other.influence,
        }
    }
}

impl Sub for Resources {
    type Output = Resources;

    fn sub(self, other: Resources) -> Resources {
        Resources {
            credits: self.credits - other.credits,
            materials: self.materials - other.materials,
            food: self.food - other.food,
            energy: self.energy - other.energy,
            influence: self.influence - other.influence,
        }
    }
}

impl Mul<f64> for Resources {
    type Output = Resources;

    fn mul(self, factor: f64) -> Resources {
        Resources {
            credits: self.credits * factor,
            materials: self.materials * factor,
            food: self.food * factor,
            energy: self.energy * factor,
            influence: self.influence * factor,
        }
    }
}

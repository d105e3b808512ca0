// core/src/models.rs
use serde::{Deserialize, Serialize};

pub const DEFAULT_MASS_KG: f64 = 70.0;

/// The only profile data the tracking engine needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunnerProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_mass", alias = "weight_kg", alias = "mass")]
    pub mass_kg: f64,
}

fn default_mass() -> f64 {
    DEFAULT_MASS_KG
}

impl Default for RunnerProfile {
    fn default() -> Self {
        Self { name: None, mass_kg: DEFAULT_MASS_KG }
    }
}

impl RunnerProfile {
    pub fn with_mass(mass_kg: f64) -> Self {
        Self { mass_kg, ..Self::default() }
    }

    /// Mass used for calories; falls back to the default for unusable values.
    pub fn effective_mass_kg(&self) -> f64 {
        if self.mass_kg.is_finite() && self.mass_kg > 0.0 { self.mass_kg } else { DEFAULT_MASS_KG }
    }
}

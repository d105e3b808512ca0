// core/src/calories.rs
use serde::{Deserialize, Serialize};

/// kcal per km per kg body mass while running.
pub const KCAL_PER_KG_KM: f64 = 1.036;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CalorieConfig {
    pub kcal_per_kg_km: f64,
}

impl Default for CalorieConfig {
    fn default() -> Self {
        Self { kcal_per_kg_km: KCAL_PER_KG_KM }
    }
}

/// Calories from distance and runner mass, floored to whole kcal.
#[inline]
pub fn estimate_calories(distance_m: f64, runner_mass_kg: f64) -> u32 {
    estimate_calories_with(distance_m, runner_mass_kg, KCAL_PER_KG_KM)
}

pub fn estimate_calories_with(distance_m: f64, runner_mass_kg: f64, kcal_per_kg_km: f64) -> u32 {
    let kcal = (distance_m / 1000.0) * runner_mass_kg * kcal_per_kg_km;
    if kcal.is_finite() && kcal > 0.0 { kcal.floor() as u32 } else { 0 }
}

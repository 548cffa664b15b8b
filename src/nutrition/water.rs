//! Water hardness texture adjustment
//!
//! Hard water (a known hard-water region with calcium over the threshold)
//! tightens dough, so water and salt come down 10%. Anything else gets 5%
//! more water.

use serde::{Deserialize, Serialize};

use super::error::{NutritionError, NutritionResult};
use crate::models::Recipe;

/// Water hardness settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterProfile {
    /// Water sources treated as hard water (exact match)
    pub hard_water_regions: Vec<String>,
    /// Calcium above this (mg/L) counts as hard
    pub calcium_threshold_mg_l: f64,
    /// Simulated calcium content of hard-water regions
    pub hard_water_calcium_mg_l: f64,
    /// Simulated calcium content of every other source
    pub default_calcium_mg_l: f64,
    pub hard_water_scale: f64,
    pub soft_water_scale: f64,
    pub water_ingredient: String,
    pub salt_ingredient: String,
}

impl Default for WaterProfile {
    fn default() -> Self {
        Self {
            hard_water_regions: vec!["Valencia".to_string()],
            calcium_threshold_mg_l: 50.0,
            hard_water_calcium_mg_l: 80.0,
            default_calcium_mg_l: 50.0,
            hard_water_scale: 0.9,
            soft_water_scale: 1.05,
            water_ingredient: "agua".to_string(),
            salt_ingredient: "sal".to_string(),
        }
    }
}

impl WaterProfile {
    pub fn is_hard_region(&self, source: &str) -> bool {
        self.hard_water_regions.iter().any(|r| r == source)
    }

    /// Simulated calcium content (mg/L) for a water source
    pub fn calcium_for(&self, source: &str) -> f64 {
        if self.is_hard_region(source) {
            self.hard_water_calcium_mg_l
        } else {
            self.default_calcium_mg_l
        }
    }

    /// Whether this source/calcium pair takes the hard-water branch
    pub fn is_hard(&self, source: &str, calcium_mg_l: f64) -> bool {
        self.is_hard_region(source) && calcium_mg_l > self.calcium_threshold_mg_l
    }
}

/// Adjust water (and salt, for hard water) to the local water.
///
/// Only the two branches exist: calcium above the threshold has no further
/// effect. The recipe must contain the water ingredient, and the salt
/// ingredient too when the hard-water branch is taken.
pub fn adjust_texture_for_water(
    source: &str,
    calcium_mg_l: f64,
    recipe: &Recipe,
    profile: &WaterProfile,
) -> NutritionResult<Recipe> {
    let water = recipe
        .ingredient(&profile.water_ingredient)
        .ok_or_else(|| NutritionError::MissingIngredient(profile.water_ingredient.clone()))?;

    let mut adjusted = recipe.clone();
    if profile.is_hard(source, calcium_mg_l) {
        let salt = recipe
            .ingredient(&profile.salt_ingredient)
            .ok_or_else(|| NutritionError::MissingIngredient(profile.salt_ingredient.clone()))?;
        tracing::debug!("Hard water from '{}' ({} mg/L calcium)", source, calcium_mg_l);
        adjusted
            .ingredients
            .insert(profile.water_ingredient.clone(), water * profile.hard_water_scale);
        adjusted
            .ingredients
            .insert(profile.salt_ingredient.clone(), salt * profile.hard_water_scale);
    } else {
        adjusted
            .ingredients
            .insert(profile.water_ingredient.clone(), water * profile.soft_water_scale);
    }
    Ok(adjusted)
}

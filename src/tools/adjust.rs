//! Recipe Adjustment Tools
//!
//! NutriScore rules, target-driven quantities, water hardness and local
//! nutrient impact.

use serde::Serialize;

use crate::config::AssistantConfig;
use crate::models::{NutrientProfile, NutrientTotals, Recipe, Replacements, Targets};
use crate::nutrition::{self, RuleSet};

/// Response for adjust_nutriscore
#[derive(Debug, Serialize)]
pub struct NutriScoreResponse {
    pub rule_set: String,
    /// Nutrients whose rule fired, in rule order
    pub fired: Vec<String>,
    pub before: NutrientTotals,
    pub after: NutrientTotals,
}

/// Response for adjust_to_targets
#[derive(Debug, Serialize)]
pub struct TargetAdjustResponse {
    pub recipe: Recipe,
    pub changed_ingredients: Vec<String>,
    pub changed_nutrients: Vec<String>,
}

/// Response for adjust_for_water
#[derive(Debug, Serialize)]
pub struct WaterAdjustResponse {
    pub source: String,
    pub calcium_mg_l: f64,
    pub hard_water: bool,
    pub recipe: Recipe,
}

/// Response for local_impact
#[derive(Debug, Serialize)]
pub struct LocalImpactResponse {
    pub ingredient: String,
    pub impact: NutrientProfile,
}

/// Pick a rule set by name: `base` (default) or `a_plus`
pub fn rule_set(config: &AssistantConfig, level: Option<&str>) -> Result<RuleSet, String> {
    match level.map(|l| l.trim().to_lowercase()).as_deref() {
        None | Some("") | Some("base") => Ok(RuleSet::base(&config.nutrient_keys)),
        Some("a_plus") | Some("a+") | Some("aplus") => Ok(RuleSet::a_plus(&config.nutrient_keys)),
        Some(other) => Err(format!(
            "Unknown NutriScore level '{}': expected 'base' or 'a_plus'",
            other
        )),
    }
}

/// Apply a NutriScore rule set to nutrient totals
pub fn adjust_nutriscore(
    config: &AssistantConfig,
    totals: &NutrientTotals,
    level: Option<&str>,
) -> Result<NutriScoreResponse, String> {
    let rules = rule_set(config, level)?;
    let fired = rules.firing(totals).into_iter().map(str::to_string).collect();
    let after = rules.apply(totals);

    Ok(NutriScoreResponse {
        rule_set: rules.name,
        fired,
        before: totals.clone(),
        after,
    })
}

/// Apply replacements and targets to a recipe
pub fn adjust_to_targets(
    recipe: &Recipe,
    replacements: &Replacements,
    targets: &Targets,
) -> Result<TargetAdjustResponse, String> {
    for (name, replacement) in replacements {
        if !replacement.quantity.is_finite() {
            return Err(format!("Replacement quantity for '{}' must be finite", name));
        }
    }
    if let Some((name, _)) = targets
        .ingredients
        .iter()
        .chain(targets.nutrients.iter())
        .find(|(_, v)| !v.is_finite())
    {
        return Err(format!("Target for '{}' must be finite", name));
    }

    let adjusted = nutrition::adjust_toward_targets(recipe, replacements, targets);
    let changed_ingredients = adjusted
        .ingredients
        .iter()
        .filter(|(name, value)| recipe.ingredients.get(*name) != Some(*value))
        .map(|(name, _)| name.clone())
        .collect();
    let changed_nutrients = adjusted
        .nutrients
        .iter()
        .filter(|(name, value)| recipe.nutrients.value(name) != Some(*value))
        .map(|(name, _)| name.to_string())
        .collect();

    Ok(TargetAdjustResponse {
        recipe: adjusted,
        changed_ingredients,
        changed_nutrients,
    })
}

/// Adjust water/salt to a water source.
///
/// Without an explicit calcium reading the simulated content for the
/// source is used.
pub fn adjust_for_water(
    config: &AssistantConfig,
    source: &str,
    calcium_mg_l: Option<f64>,
    recipe: &Recipe,
) -> Result<WaterAdjustResponse, String> {
    let profile = &config.water;
    let calcium = calcium_mg_l.unwrap_or_else(|| profile.calcium_for(source));
    if !calcium.is_finite() || calcium < 0.0 {
        return Err(format!("Calcium must be a non-negative number, got {}", calcium));
    }
    let adjusted = nutrition::adjust_texture_for_water(source, calcium, recipe, profile)
        .map_err(|e| format!("Failed to adjust for water: {}", e))?;

    Ok(WaterAdjustResponse {
        source: source.to_string(),
        calcium_mg_l: calcium,
        hard_water: profile.is_hard(source, calcium),
        recipe: adjusted,
    })
}

/// Difference between an ingredient and its local equivalent
pub fn local_impact(
    ingredient_name: &str,
    ingredient: &NutrientProfile,
    local: &NutrientProfile,
) -> Result<LocalImpactResponse, String> {
    if local.is_empty() {
        return Err("Local profile has no nutrients to compare".to_string());
    }
    Ok(LocalImpactResponse {
        ingredient: ingredient_name.to_string(),
        impact: nutrition::local_impact(ingredient, local),
    })
}

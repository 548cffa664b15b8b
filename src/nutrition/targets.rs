//! Target-driven quantity adjustment
//!
//! One pass that swaps in registered replacement quantities and then moves
//! each value toward its target amount.

use std::collections::BTreeMap;

use crate::models::{NutrientTotals, Recipe, Replacements, Targets};

/// Move `current` toward `target`.
///
/// `delta = target - current`; a positive delta is added, otherwise the
/// value becomes `max(current + delta, 0)`. Both branches land on the
/// target, except that a negative target clamps to zero.
pub fn step_toward(current: f64, target: f64) -> f64 {
    let delta = target - current;
    if delta > 0.0 {
        current + delta
    } else {
        (current + delta).max(0.0)
    }
}

/// Adjust a recipe toward replacement quantities and targets.
///
/// For every ingredient in the recipe: a registered replacement overwrites
/// the quantity, then an ingredient target (if any) is applied to the
/// overwritten value. Nutrient totals with a nutrient target are moved the
/// same way. Each key is touched at most once; keys that only appear in
/// `replacements` or `targets` are ignored.
pub fn adjust_toward_targets(
    recipe: &Recipe,
    replacements: &Replacements,
    targets: &Targets,
) -> Recipe {
    let mut ingredients = BTreeMap::new();
    for (name, quantity) in &recipe.ingredients {
        let mut value = *quantity;
        if let Some(replacement) = replacements.get(name) {
            tracing::debug!(
                "{}: replaced by '{}' at {} (was {})",
                name,
                replacement.name,
                replacement.quantity,
                value
            );
            value = replacement.quantity;
        }
        if let Some(target) = targets.ingredients.get(name) {
            value = step_toward(value, *target);
        }
        ingredients.insert(name.clone(), value);
    }

    let mut nutrients = NutrientTotals::new();
    for (name, amount) in recipe.nutrients.iter() {
        let value = match targets.nutrients.get(name) {
            Some(target) => step_toward(amount, *target),
            None => amount,
        };
        nutrients.set(name, value);
    }

    Recipe {
        name: recipe.name.clone(),
        ingredients,
        nutrients,
    }
}

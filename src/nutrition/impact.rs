//! Local nutrient impact
//!
//! How an ingredient differs from the locally sourced equivalent.

use crate::models::NutrientProfile;

/// `ingredient - local` for every nutrient of the local profile.
///
/// Nutrients the ingredient lacks count as zero, so the difference is the
/// negated local amount. Nutrients only the ingredient has are not reported.
pub fn local_impact(ingredient: &NutrientProfile, local: &NutrientProfile) -> NutrientProfile {
    local
        .iter()
        .map(|(nutrient, amount)| (nutrient, ingredient.get(nutrient) - amount))
        .fold(NutrientProfile::new(), |acc, (nutrient, diff)| acc.with(nutrient, diff))
}

//! Recipe model
//!
//! A recipe keeps ingredient quantities and nutrient totals in two separate
//! maps. A [`ContributionTable`] links them: it holds each ingredient's
//! nutrient contribution per unit of quantity.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::{NutrientProfile, NutrientTotals};

/// Ingredient name -> quantity (grams or ml, as the caller chooses)
pub type IngredientQuantities = BTreeMap<String, f64>;

/// A recipe: what goes in, and the nutrient totals it adds up to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub ingredients: IngredientQuantities,
    #[serde(default)]
    pub nutrients: NutrientTotals,
}

impl Recipe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_ingredient(mut self, name: impl Into<String>, quantity: f64) -> Self {
        self.ingredients.insert(name.into(), quantity);
        self
    }

    pub fn with_nutrient(mut self, name: impl Into<String>, amount: f64) -> Self {
        self.nutrients.set(name, amount);
        self
    }

    pub fn ingredient(&self, name: &str) -> Option<f64> {
        self.ingredients.get(name).copied()
    }

    /// Split a flat `name -> amount` mapping into ingredients and nutrients.
    ///
    /// Keys listed in `nutrient_names` become nutrient totals, everything
    /// else is an ingredient quantity.
    pub fn split_mixed<'a, I>(mixed: &BTreeMap<String, f64>, nutrient_names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let nutrient_names: BTreeSet<&str> = nutrient_names.into_iter().collect();
        let mut recipe = Self::new();
        for (key, value) in mixed {
            if nutrient_names.contains(key.as_str()) {
                recipe.nutrients.set(key.clone(), *value);
            } else {
                recipe.ingredients.insert(key.clone(), *value);
            }
        }
        recipe
    }

    /// Recompute nutrient totals from ingredient quantities.
    ///
    /// Ingredients missing from the table contribute nothing. Nutrients the
    /// table never mentions keep their current totals.
    pub fn recompute_nutrients(&self, table: &ContributionTable) -> Self {
        let computed = table.totals_for(&self.ingredients);
        let mut nutrients = self.nutrients.clone();
        for (name, amount) in computed.iter() {
            nutrients.set(name, amount);
        }
        Self {
            name: self.name.clone(),
            ingredients: self.ingredients.clone(),
            nutrients,
        }
    }
}

/// Ingredient name -> nutrient contribution per unit of quantity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContributionTable(BTreeMap<String, NutrientProfile>);

impl ContributionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ingredient: impl Into<String>, per_unit: NutrientProfile) {
        self.0.insert(ingredient.into(), per_unit);
    }

    pub fn with(mut self, ingredient: impl Into<String>, per_unit: NutrientProfile) -> Self {
        self.insert(ingredient, per_unit);
        self
    }

    pub fn per_unit(&self, ingredient: &str) -> Option<&NutrientProfile> {
        self.0.get(ingredient)
    }

    /// Sum of `quantity * per_unit` over the given ingredients
    pub fn totals_for(&self, quantities: &IngredientQuantities) -> NutrientTotals {
        quantities
            .iter()
            .filter_map(|(name, quantity)| match self.0.get(name) {
                Some(per_unit) => Some(per_unit.scale(*quantity)),
                None => {
                    tracing::debug!("No nutrient contribution registered for '{}'", name);
                    None
                }
            })
            .sum()
    }
}

/// A substitute ingredient registered for a recipe ingredient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replacement {
    pub name: String,
    pub quantity: f64,
}

/// Ingredient name -> its registered replacement
pub type Replacements = BTreeMap<String, Replacement>;

/// Target amounts, kept apart for ingredients and nutrients
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Targets {
    #[serde(default)]
    pub ingredients: BTreeMap<String, f64>,
    #[serde(default)]
    pub nutrients: BTreeMap<String, f64>,
}

impl Targets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingredient(mut self, name: impl Into<String>, amount: f64) -> Self {
        self.ingredients.insert(name.into(), amount);
        self
    }

    pub fn nutrient(mut self, name: impl Into<String>, amount: f64) -> Self {
        self.nutrients.insert(name.into(), amount);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_mixed_separates_nutrients() {
        let mixed: BTreeMap<String, f64> = [
            ("agua", 200.0),
            ("harina", 500.0),
            ("azúcar", 40.0),
            ("fibra", 4.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let recipe = Recipe::split_mixed(&mixed, ["azúcar", "fibra", "calorías"]);
        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.ingredient("harina"), Some(500.0));
        assert_eq!(recipe.nutrients.get("azúcar"), 40.0);
        assert_eq!(recipe.nutrients.get("fibra"), 4.0);
    }

    #[test]
    fn test_recompute_nutrients_from_contributions() {
        let table = ContributionTable::new()
            .with("harina", NutrientProfile::from_pairs([("fibra", 0.03), ("calorías", 3.6)]))
            .with("azúcar blanco", NutrientProfile::from_pairs([("azúcar", 1.0), ("calorías", 4.0)]));
        let recipe = Recipe::new()
            .with_ingredient("harina", 100.0)
            .with_ingredient("azúcar blanco", 20.0)
            .with_ingredient("agua", 200.0)
            .with_nutrient("sal", 1.0);

        let updated = recipe.recompute_nutrients(&table);
        assert!((updated.nutrients.get("fibra") - 3.0).abs() < 1e-9);
        assert!((updated.nutrients.get("calorías") - 440.0).abs() < 1e-9);
        assert!((updated.nutrients.get("azúcar") - 20.0).abs() < 1e-9);
        assert_eq!(updated.nutrients.get("sal"), 1.0);
        assert!(recipe.nutrients.value("fibra").is_none());
    }
}

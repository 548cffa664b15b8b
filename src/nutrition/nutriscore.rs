//! NutriScore heuristics
//!
//! Threshold rules that nudge recipe nutrient totals toward a better label.
//! Each rule looks at one nutrient; rules run in a fixed order and return a
//! new set of totals.

use serde::{Deserialize, Serialize};

use crate::models::{NutrientTotals, Recipe};

/// Names the rules use for sugar, fiber and calories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutrientKeys {
    pub sugar: String,
    pub fiber: String,
    pub calories: String,
}

impl Default for NutrientKeys {
    fn default() -> Self {
        Self {
            sugar: "sugar".to_string(),
            fiber: "fiber".to_string(),
            calories: "calories".to_string(),
        }
    }
}

impl NutrientKeys {
    /// Keys used by Spanish-language recipes (`azúcar`, `fibra`, `calorías`)
    pub fn spanish() -> Self {
        Self {
            sugar: "azúcar".to_string(),
            fiber: "fibra".to_string(),
            calories: "calorías".to_string(),
        }
    }

    pub fn all(&self) -> [&str; 3] {
        [self.sugar.as_str(), self.fiber.as_str(), self.calories.as_str()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "threshold", rename_all = "lowercase")]
pub enum Condition {
    Above(f64),
    Below(f64),
}

impl Condition {
    pub fn holds(&self, value: f64) -> bool {
        match *self {
            Condition::Above(threshold) => value > threshold,
            Condition::Below(threshold) => value < threshold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "lowercase")]
pub enum Action {
    Scale(f64),
    Add(f64),
}

impl Action {
    pub fn apply(&self, value: f64) -> f64 {
        match *self {
            Action::Scale(factor) => value * factor,
            Action::Add(amount) => value + amount,
        }
    }
}

/// One threshold rule on a single nutrient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutriScoreRule {
    pub nutrient: String,
    pub condition: Condition,
    pub action: Action,
}

impl NutriScoreRule {
    pub fn new(nutrient: impl Into<String>, condition: Condition, action: Action) -> Self {
        Self {
            nutrient: nutrient.into(),
            condition,
            action,
        }
    }

    /// Whether the rule would change these totals (absent nutrients read as 0)
    pub fn fires(&self, totals: &NutrientTotals) -> bool {
        self.condition.holds(totals.get(&self.nutrient))
    }
}

/// An ordered set of rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub name: String,
    pub rules: Vec<NutriScoreRule>,
}

impl RuleSet {
    /// Base rules: sugar above 50 drops 20%, fiber below 5 gains 2
    pub fn base(keys: &NutrientKeys) -> Self {
        Self {
            name: "base".to_string(),
            rules: vec![
                NutriScoreRule::new(&keys.sugar, Condition::Above(50.0), Action::Scale(0.8)),
                NutriScoreRule::new(&keys.fiber, Condition::Below(5.0), Action::Add(2.0)),
            ],
        }
    }

    /// A+ rules: sugar above 30 drops 30%, fiber below 8 gains 3, calories
    /// above 300 drop 10%
    pub fn a_plus(keys: &NutrientKeys) -> Self {
        Self {
            name: "a_plus".to_string(),
            rules: vec![
                NutriScoreRule::new(&keys.sugar, Condition::Above(30.0), Action::Scale(0.7)),
                NutriScoreRule::new(&keys.fiber, Condition::Below(8.0), Action::Add(3.0)),
                NutriScoreRule::new(&keys.calories, Condition::Above(300.0), Action::Scale(0.9)),
            ],
        }
    }

    /// Apply every rule in order and return the adjusted totals.
    ///
    /// A nutrient missing from the totals reads as 0: a missing fiber entry
    /// is created by the fiber bonus, a missing sugar entry stays missing.
    pub fn apply(&self, totals: &NutrientTotals) -> NutrientTotals {
        let mut adjusted = totals.clone();
        for rule in &self.rules {
            let current = adjusted.get(&rule.nutrient);
            if rule.condition.holds(current) {
                let next = rule.action.apply(current);
                tracing::debug!(
                    "[{}] {}: {} -> {}",
                    self.name,
                    rule.nutrient,
                    current,
                    next
                );
                adjusted.set(rule.nutrient.clone(), next);
            }
        }
        adjusted
    }

    /// Apply to a recipe's nutrient totals, leaving ingredients as they are
    pub fn apply_to_recipe(&self, recipe: &Recipe) -> Recipe {
        Recipe {
            name: recipe.name.clone(),
            ingredients: recipe.ingredients.clone(),
            nutrients: self.apply(&recipe.nutrients),
        }
    }

    /// Nutrients whose rule fires against these totals, in rule order
    pub fn firing(&self, totals: &NutrientTotals) -> Vec<&str> {
        self.rules
            .iter()
            .filter(|rule| rule.fires(totals))
            .map(|rule| rule.nutrient.as_str())
            .collect()
    }
}

/// Base NutriScore adjustment
pub fn adjust_to_nutriscore(totals: &NutrientTotals, keys: &NutrientKeys) -> NutrientTotals {
    RuleSet::base(keys).apply(totals)
}

/// Stricter adjustment aiming at an A+ label
pub fn adjust_to_nutriscore_a_plus(totals: &NutrientTotals, keys: &NutrientKeys) -> NutrientTotals {
    RuleSet::a_plus(keys).apply(totals)
}

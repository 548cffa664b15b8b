//! Data models
//!
//! Nutrient profiles, ingredient records, recipes and fetched products.

mod ingredient;
mod nutrition;
mod recipe;
mod record;

pub use ingredient::{IngredientRecord, ProfileCatalog};
pub use nutrition::{NutrientProfile, NutrientTotals};
pub use recipe::{
    ContributionTable, IngredientQuantities, Recipe, Replacement, Replacements, Targets,
};
pub use record::{DataSource, NutritionRecord, ProductNutrients, PRODUCT_NUTRIENT_KEYS};

//! Fetched nutrition records
//!
//! Common shape for products pulled from Open Food Facts and USDA.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::NutrientProfile;

/// Where a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    OpenFoodFacts,
    Usda,
    #[default]
    Unknown,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::OpenFoodFacts => "open_food_facts",
            DataSource::Usda => "usda",
            DataSource::Unknown => "unknown",
        }
    }
}

/// A product with the four features used for normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionRecord {
    pub product_name: Option<String>,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub carbohydrates: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub source: DataSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
}

impl NutritionRecord {
    /// Feature row in the order `[calories, fat, carbohydrates, protein]`
    pub fn features(&self) -> [f64; 4] {
        [self.calories, self.fat, self.carbohydrates, self.protein]
    }

    pub fn profile(&self) -> NutrientProfile {
        NutrientProfile::from_pairs([
            ("calories", self.calories),
            ("fat", self.fat),
            ("carbohydrates", self.carbohydrates),
            ("protein", self.protein),
        ])
    }
}

/// Nutrient keys of a barcode lookup, in regressor input order
pub const PRODUCT_NUTRIENT_KEYS: [&str; 5] =
    ["energia", "proteinas", "grasas", "carbohidratos", "fibra"];

/// Normalized nutrients of a single product looked up by barcode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductNutrients {
    pub barcode: String,
    #[serde(default)]
    pub ingredients_text: String,
    pub nutrients: NutrientProfile,
}

impl ProductNutrients {
    /// Regressor input row, see [`PRODUCT_NUTRIENT_KEYS`]
    pub fn training_features(&self) -> [f64; 5] {
        PRODUCT_NUTRIENT_KEYS.map(|key| self.nutrients.get(key))
    }
}

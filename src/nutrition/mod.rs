//! Nutrition heuristics
//!
//! Profile similarity, replacement search, recipe adjusters and feature
//! normalization.

pub mod error;
pub mod impact;
pub mod normalize;
pub mod nutriscore;
pub mod replacements;
pub mod similarity;
pub mod targets;
pub mod water;

pub use error::{NutritionError, NutritionResult};
pub use impact::local_impact;
pub use normalize::{normalize_records, MinMaxScaler, NormalizeError, NormalizeResult};
pub use nutriscore::{
    adjust_to_nutriscore, adjust_to_nutriscore_a_plus, Action, Condition, NutriScoreRule,
    NutrientKeys, RuleSet,
};
pub use replacements::{find_catalog_replacements, find_replacements};
pub use similarity::{is_similar, mismatches, SimilarityTolerance, DEFAULT_TOLERANCE};
pub use targets::{adjust_toward_targets, step_toward};
pub use water::{adjust_texture_for_water, WaterProfile};

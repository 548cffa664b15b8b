//! Nutrition error types

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NutritionError {
    #[error("Similarity tolerance must be finite and non-negative, got {0}")]
    InvalidTolerance(f64),

    #[error("Reference profile has no nutrients and would match every candidate")]
    EmptyReference,

    #[error("Recipe has no '{0}' ingredient")]
    MissingIngredient(String),
}

pub type NutritionResult<T> = Result<T, NutritionError>;

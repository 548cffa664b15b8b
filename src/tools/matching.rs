//! Matching Tools
//!
//! Profile comparison and replacement search.

use std::path::PathBuf;

use serde::Serialize;

use crate::config::AssistantConfig;
use crate::models::{IngredientRecord, NutrientProfile};
use crate::nutrition::{self, SimilarityTolerance};
use crate::store;

/// Per-nutrient difference above tolerance
#[derive(Debug, Serialize)]
pub struct Mismatch {
    pub nutrient: String,
    pub difference: f64,
}

/// Response for compare_profiles
#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub similar: bool,
    pub tolerance: f64,
    pub mismatches: Vec<Mismatch>,
}

/// Response for find_replacements
#[derive(Debug, Serialize)]
pub struct ReplacementsResponse {
    pub target: String,
    pub tolerance: f64,
    pub candidates_checked: usize,
    pub replacements: Vec<IngredientRecord>,
}

/// Response for catalog_replacements
#[derive(Debug, Serialize)]
pub struct CatalogReplacementsResponse {
    pub catalog_path: String,
    pub catalog_size: usize,
    pub tolerance: f64,
    pub matches: Vec<String>,
}

/// Explicit tolerance if given, otherwise the configured one
pub(crate) fn resolve_tolerance(
    config: &AssistantConfig,
    tolerance: Option<f64>,
) -> Result<SimilarityTolerance, String> {
    match tolerance {
        Some(value) => SimilarityTolerance::new(value).map_err(|e| e.to_string()),
        None => Ok(config.similarity_tolerance),
    }
}

/// Compare a candidate profile against a reference
pub fn compare_profiles(
    config: &AssistantConfig,
    reference: &NutrientProfile,
    candidate: &NutrientProfile,
    tolerance: Option<f64>,
) -> Result<CompareResponse, String> {
    let tolerance = resolve_tolerance(config, tolerance)?;
    let mismatches: Vec<Mismatch> = nutrition::mismatches(reference, candidate, tolerance)
        .into_iter()
        .map(|(nutrient, difference)| Mismatch { nutrient, difference })
        .collect();

    Ok(CompareResponse {
        similar: nutrition::is_similar(reference, candidate, tolerance),
        tolerance: tolerance.value(),
        mismatches,
    })
}

/// Candidates whose profile matches the target's
pub fn find_replacements(
    config: &AssistantConfig,
    target: &IngredientRecord,
    candidates: &[IngredientRecord],
    tolerance: Option<f64>,
) -> Result<ReplacementsResponse, String> {
    if target.name.trim().is_empty() {
        return Err("Target ingredient name cannot be empty".to_string());
    }
    let tolerance = resolve_tolerance(config, tolerance)?;
    let replacements = nutrition::find_replacements(target, candidates, tolerance)
        .map_err(|e| format!("Failed to find replacements: {}", e))?;

    Ok(ReplacementsResponse {
        target: target.name.clone(),
        tolerance: tolerance.value(),
        candidates_checked: candidates.len(),
        replacements,
    })
}

/// Catalog entries matched by a query profile.
///
/// `catalog_file` is resolved against the data directory; the USDA
/// ingredient catalog is used when omitted.
pub fn catalog_replacements(
    config: &AssistantConfig,
    query: &NutrientProfile,
    catalog_file: Option<&str>,
    tolerance: Option<f64>,
) -> Result<CatalogReplacementsResponse, String> {
    let tolerance = resolve_tolerance(config, tolerance)?;
    let path: PathBuf = match catalog_file {
        Some(file) => config.paths.resolve(file),
        None => config.paths.ingredient_catalog(),
    };
    let catalog = store::load_catalog(&path)
        .map_err(|e| format!("Failed to load catalog {}: {}", path.display(), e))?;
    let matches = nutrition::find_catalog_replacements(query, &catalog, tolerance)
        .map_err(|e| format!("Failed to search catalog: {}", e))?;

    Ok(CatalogReplacementsResponse {
        catalog_path: path.display().to_string(),
        catalog_size: catalog.len(),
        tolerance: tolerance.value(),
        matches,
    })
}

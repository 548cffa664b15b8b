//! Replacement candidates
//!
//! Filters a candidate set down to the entries similar to a target. No
//! ranking: output keeps candidate order.

use super::error::{NutritionError, NutritionResult};
use super::similarity::{is_similar, SimilarityTolerance};
use crate::models::{IngredientRecord, NutrientProfile, ProfileCatalog};

/// Candidates whose profile is within `tolerance` of the target's profile.
///
/// An empty target profile is rejected: it would return every candidate.
pub fn find_replacements(
    target: &IngredientRecord,
    candidates: &[IngredientRecord],
    tolerance: SimilarityTolerance,
) -> NutritionResult<Vec<IngredientRecord>> {
    if target.profile.is_empty() {
        return Err(NutritionError::EmptyReference);
    }

    let found: Vec<IngredientRecord> = candidates
        .iter()
        .filter(|candidate| is_similar(&target.profile, &candidate.profile, tolerance))
        .cloned()
        .collect();

    tracing::debug!(
        "{} of {} candidates match '{}' within {}",
        found.len(),
        candidates.len(),
        target.name,
        tolerance.value()
    );
    Ok(found)
}

/// Names of catalog entries matched by a query profile.
///
/// The query is the reference: every nutrient it lists must be within
/// tolerance of the catalog entry's value (zero when the entry lacks it).
pub fn find_catalog_replacements(
    query: &NutrientProfile,
    catalog: &ProfileCatalog,
    tolerance: SimilarityTolerance,
) -> NutritionResult<Vec<String>> {
    if query.is_empty() {
        return Err(NutritionError::EmptyReference);
    }

    Ok(catalog
        .iter()
        .filter(|(_, profile)| is_similar(query, profile, tolerance))
        .map(|(name, _)| name.to_string())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, energia: f64, grasas: f64) -> IngredientRecord {
        IngredientRecord::new(
            name,
            NutrientProfile::from_pairs([
                ("energia", energia),
                ("proteinas", 0.0),
                ("grasas", grasas),
                ("carbohidratos", 0.0),
                ("fibra", 0.0),
            ]),
        )
    }

    #[test]
    fn test_oils_replace_each_other() {
        let target = record("aceite de oliva", 884.0, 100.0);
        let candidates = vec![
            record("aceite de oliva", 884.0, 100.0),
            record("mantequilla", 717.0, 81.0),
            record("aceite de girasol", 884.0, 100.0),
        ];
        let found = find_replacements(&target, &candidates, SimilarityTolerance::default()).unwrap();
        let names: Vec<&str> = found.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["aceite de oliva", "aceite de girasol"]);
    }

    #[test]
    fn test_output_is_ordered_subset_of_candidates() {
        let target = record("x", 100.0, 10.0);
        let candidates: Vec<IngredientRecord> = (0..15)
            .map(|i| record(&format!("c{i}"), 95.0 + i as f64, 10.0))
            .collect();
        let found = find_replacements(&target, &candidates, SimilarityTolerance::default()).unwrap();

        let mut last_index = None;
        for r in &found {
            let index = candidates.iter().position(|c| c == r).unwrap();
            assert!(last_index.map_or(true, |last| index > last));
            last_index = Some(index);
        }
        // 95..=105 are within tolerance of 100
        assert_eq!(found.len(), 11);
    }

    #[test]
    fn test_empty_candidate_set_yields_empty() {
        let target = record("x", 100.0, 10.0);
        let found = find_replacements(&target, &[], SimilarityTolerance::default()).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_empty_target_is_rejected() {
        let target = IngredientRecord::new("nothing", NutrientProfile::new());
        let candidates = vec![record("a", 1.0, 1.0)];
        assert_eq!(
            find_replacements(&target, &candidates, SimilarityTolerance::default()),
            Err(NutritionError::EmptyReference)
        );
    }

    #[test]
    fn test_catalog_replacements_return_names() {
        let catalog: ProfileCatalog = vec![
            (
                "garbanzo".to_string(),
                NutrientProfile::from_pairs([("energia", 640.0), ("proteinas", 35.0)]),
            ),
            (
                "arroz".to_string(),
                NutrientProfile::from_pairs([("energia", 365.0), ("proteinas", 7.0)]),
            ),
        ]
        .into_iter()
        .collect();
        let query = NutrientProfile::from_pairs([("energia", 642.0), ("proteinas", 33.5)]);

        let names =
            find_catalog_replacements(&query, &catalog, SimilarityTolerance::default()).unwrap();
        assert_eq!(names, vec!["garbanzo".to_string()]);
    }
}

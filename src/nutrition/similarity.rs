//! Nutrient profile similarity
//!
//! All-or-nothing comparison of a candidate profile against a reference
//! under a fixed per-nutrient tolerance.

use serde::{Deserialize, Serialize};

use super::error::{NutritionError, NutritionResult};
use crate::models::NutrientProfile;

/// Default per-nutrient tolerance, in the profile's own units
pub const DEFAULT_TOLERANCE: f64 = 5.0;

/// A validated tolerance: finite and `>= 0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SimilarityTolerance(f64);

impl SimilarityTolerance {
    pub fn new(value: f64) -> NutritionResult<Self> {
        if value.is_finite() && value >= 0.0 {
            Ok(Self(value))
        } else {
            Err(NutritionError::InvalidTolerance(value))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for SimilarityTolerance {
    fn default() -> Self {
        Self(DEFAULT_TOLERANCE)
    }
}

impl TryFrom<f64> for SimilarityTolerance {
    type Error = NutritionError;

    fn try_from(value: f64) -> NutritionResult<Self> {
        Self::new(value)
    }
}

impl From<SimilarityTolerance> for f64 {
    fn from(tolerance: SimilarityTolerance) -> f64 {
        tolerance.0
    }
}

/// Whether `candidate` is within `tolerance` of `reference` on every
/// nutrient the reference lists.
///
/// Asymmetric: nutrients only the candidate has are ignored, nutrients the
/// candidate lacks count as zero. An empty reference matches everything.
pub fn is_similar(
    reference: &NutrientProfile,
    candidate: &NutrientProfile,
    tolerance: SimilarityTolerance,
) -> bool {
    reference
        .iter()
        .all(|(nutrient, amount)| (amount - candidate.get(nutrient)).abs() <= tolerance.value())
}

/// Nutrients of `reference` that fall outside the tolerance, with the
/// absolute difference. Empty exactly when [`is_similar`] is true.
pub fn mismatches(
    reference: &NutrientProfile,
    candidate: &NutrientProfile,
    tolerance: SimilarityTolerance,
) -> Vec<(String, f64)> {
    reference
        .iter()
        .filter_map(|(nutrient, amount)| {
            let diff = (amount - candidate.get(nutrient)).abs();
            (diff > tolerance.value()).then(|| (nutrient.to_string(), diff))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tol(v: f64) -> SimilarityTolerance {
        SimilarityTolerance::new(v).unwrap()
    }

    fn oil() -> NutrientProfile {
        NutrientProfile::from_pairs([
            ("energia", 884.0),
            ("proteinas", 0.0),
            ("grasas", 100.0),
            ("carbohidratos", 0.0),
            ("fibra", 0.0),
        ])
    }

    #[test]
    fn test_within_tolerance_matches() {
        let candidate = oil().with("energia", 889.0).with("grasas", 95.0);
        assert!(is_similar(&oil(), &candidate, tol(5.0)));
    }

    #[test]
    fn test_one_field_over_tolerance_fails() {
        let candidate = oil().with("grasas", 94.9);
        assert!(!is_similar(&oil(), &candidate, tol(5.0)));
        let diffs = mismatches(&oil(), &candidate, tol(5.0));
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].0, "grasas");
    }

    #[test]
    fn test_missing_candidate_field_counts_as_zero() {
        let reference = NutrientProfile::from_pairs([("fibra", 4.0)]);
        assert!(is_similar(&reference, &NutrientProfile::new(), tol(5.0)));

        let reference = NutrientProfile::from_pairs([("fibra", 6.0)]);
        assert!(!is_similar(&reference, &NutrientProfile::new(), tol(5.0)));
    }

    #[test]
    fn test_comparison_is_asymmetric() {
        let reference = NutrientProfile::from_pairs([("fat", 10.0)]);
        let candidate = NutrientProfile::from_pairs([("fat", 10.0), ("sugar", 90.0)]);
        assert!(is_similar(&reference, &candidate, tol(5.0)));
        assert!(!is_similar(&candidate, &reference, tol(5.0)));
    }

    #[test]
    fn test_profile_matches_itself_at_zero_tolerance() {
        assert!(is_similar(&oil(), &oil(), tol(0.0)));
    }

    #[test]
    fn test_empty_reference_matches_everything() {
        assert!(is_similar(&NutrientProfile::new(), &oil(), tol(0.0)));
    }

    #[test]
    fn test_tolerance_rejects_negative_and_nan() {
        assert_eq!(
            SimilarityTolerance::new(-1.0),
            Err(NutritionError::InvalidTolerance(-1.0))
        );
        assert!(SimilarityTolerance::new(f64::NAN).is_err());
        assert_eq!(SimilarityTolerance::default().value(), 5.0);
    }
}

//! Shared nutrient profile structure
//!
//! Used by ingredient records, recipe nutrient totals and fetched products.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Nutrient name -> amount.
///
/// Missing nutrients read as zero through [`NutrientProfile::get`]. Note that
/// this silently masks malformed upstream data: a record that lost its
/// `fiber` field compares exactly like one with `fiber: 0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NutrientProfile(BTreeMap<String, f64>);

/// Nutrient totals of a recipe share the profile representation.
pub type NutrientTotals = NutrientProfile;

impl NutrientProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a profile from `(name, amount)` pairs
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        Self(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build a profile from a loose JSON object, keeping numeric fields only.
    ///
    /// Strings, booleans, nulls and nested values are dropped, so a record
    /// like `{"ingrediente": "aceite", "energia": 884}` yields `{energia: 884}`.
    pub fn from_json_object(object: &Map<String, Value>) -> Self {
        Self(
            object
                .iter()
                .filter_map(|(key, value)| match value {
                    Value::Number(n) => n.as_f64().map(|v| (key.clone(), v)),
                    _ => None,
                })
                .collect(),
        )
    }

    /// Amount of a nutrient, zero when absent
    pub fn get(&self, nutrient: &str) -> f64 {
        self.0.get(nutrient).copied().unwrap_or(0.0)
    }

    /// Amount of a nutrient if it is present
    pub fn value(&self, nutrient: &str) -> Option<f64> {
        self.0.get(nutrient).copied()
    }

    pub fn contains(&self, nutrient: &str) -> bool {
        self.0.contains_key(nutrient)
    }

    pub fn set(&mut self, nutrient: impl Into<String>, amount: f64) {
        self.0.insert(nutrient.into(), amount);
    }

    /// Builder-style variant of [`NutrientProfile::set`]
    pub fn with(mut self, nutrient: impl Into<String>, amount: f64) -> Self {
        self.set(nutrient, amount);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Scale every nutrient by a multiplier
    pub fn scale(&self, multiplier: f64) -> Self {
        Self(self.0.iter().map(|(k, v)| (k.clone(), v * multiplier)).collect())
    }

    /// Add another profile to this one (union of nutrient names)
    pub fn add(&self, other: &NutrientProfile) -> Self {
        let mut out = self.0.clone();
        for (k, v) in &other.0 {
            *out.entry(k.clone()).or_insert(0.0) += v;
        }
        Self(out)
    }

    pub fn into_inner(self) -> BTreeMap<String, f64> {
        self.0
    }
}

impl From<BTreeMap<String, f64>> for NutrientProfile {
    fn from(map: BTreeMap<String, f64>) -> Self {
        Self(map)
    }
}

impl std::ops::Add for NutrientProfile {
    type Output = NutrientProfile;

    fn add(self, other: NutrientProfile) -> NutrientProfile {
        NutrientProfile::add(&self, &other)
    }
}

impl std::ops::Mul<f64> for NutrientProfile {
    type Output = NutrientProfile;

    fn mul(self, multiplier: f64) -> NutrientProfile {
        self.scale(multiplier)
    }
}

impl std::iter::Sum for NutrientProfile {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(NutrientProfile::new(), |acc, n| acc + n)
    }
}

//! Ingredient record model
//!
//! A named nutrient profile, plus the name-keyed reference catalog loaded
//! from static JSON files.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::NutrientProfile;

/// Fields accepted as the ingredient name in loose JSON records
const NAME_FIELDS: [&str; 4] = ["name", "ingrediente", "product_name", "description"];

/// An ingredient with its nutrient profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientRecord {
    pub name: String,
    #[serde(default)]
    pub profile: NutrientProfile,
}

impl IngredientRecord {
    pub fn new(name: impl Into<String>, profile: NutrientProfile) -> Self {
        Self {
            name: name.into(),
            profile,
        }
    }

    /// Build a record from a flat JSON object such as
    /// `{"ingrediente": "aceite de girasol", "energia": 884, "grasas": 100}`.
    ///
    /// The first string field among `name`, `ingrediente`, `product_name` and
    /// `description` becomes the name; numeric fields become the profile.
    /// Returns `None` for non-objects.
    pub fn from_loose_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let name = NAME_FIELDS
            .iter()
            .find_map(|field| object.get(*field).and_then(Value::as_str))
            .unwrap_or_default()
            .to_string();
        Some(Self {
            name,
            profile: NutrientProfile::from_json_object(object),
        })
    }
}

/// Reference profiles keyed by ingredient name, in catalog order.
///
/// The on-disk shape is `{"garbanzo": {"Protein": 20.5, ...}, ...}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileCatalog {
    entries: Vec<(String, NutrientProfile)>,
}

impl ProfileCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a JSON object of objects.
    ///
    /// Entries whose value is not an object are skipped; numeric fields of
    /// each entry form its profile.
    pub fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let entries = object
            .iter()
            .filter_map(|(name, profile)| {
                profile
                    .as_object()
                    .map(|p| (name.clone(), NutrientProfile::from_json_object(p)))
            })
            .collect();
        Some(Self { entries })
    }

    pub fn insert(&mut self, name: impl Into<String>, profile: NutrientProfile) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = profile,
            None => self.entries.push((name, profile)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&NutrientProfile> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NutrientProfile)> {
        self.entries.iter().map(|(n, p)| (n.as_str(), p))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert to the JSON object shape used on disk
    pub fn to_json(&self) -> Value {
        let object = self
            .entries
            .iter()
            .map(|(name, profile)| {
                let nutrients = profile
                    .iter()
                    .map(|(k, v)| (k.to_string(), Value::from(v)))
                    .collect();
                (name.clone(), Value::Object(nutrients))
            })
            .collect();
        Value::Object(object)
    }
}

impl FromIterator<(String, NutrientProfile)> for ProfileCatalog {
    fn from_iter<I: IntoIterator<Item = (String, NutrientProfile)>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for (name, profile) in iter {
            catalog.insert(name, profile);
        }
        catalog
    }
}

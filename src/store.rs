//! Flat JSON persistence
//!
//! Fetched record arrays, the ingredient catalog and trained models are
//! stored as pretty-printed JSON files under the data directory.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::{IngredientRecord, ProfileCatalog};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected file contents: {0}")]
    Shape(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Write `value` as pretty JSON, creating parent directories
pub fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text)?;
    tracing::info!("Saved {}", path.display());
    Ok(())
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> StoreResult<T> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Read a `{"name": {"nutrient": value}}` catalog
pub fn load_catalog(path: &Path) -> StoreResult<ProfileCatalog> {
    let value: Value = load_json(path)?;
    let catalog = ProfileCatalog::from_json(&value).ok_or_else(|| {
        StoreError::Shape(format!("{} is not a JSON object", path.display()))
    })?;
    tracing::debug!("Loaded {} catalog entries from {}", catalog.len(), path.display());
    Ok(catalog)
}

pub fn save_catalog(path: &Path, catalog: &ProfileCatalog) -> StoreResult<()> {
    save_json(path, &catalog.to_json())
}

/// Read an array of loose ingredient objects (see
/// [`IngredientRecord::from_loose_json`]); non-object items are skipped
pub fn load_ingredients(path: &Path) -> StoreResult<Vec<IngredientRecord>> {
    let value: Value = load_json(path)?;
    let items = value.as_array().ok_or_else(|| {
        StoreError::Shape(format!("{} is not a JSON array", path.display()))
    })?;
    let records: Vec<IngredientRecord> = items
        .iter()
        .filter_map(IngredientRecord::from_loose_json)
        .collect();
    if records.len() != items.len() {
        tracing::warn!(
            "Skipped {} non-object entries in {}",
            items.len() - records.len(),
            path.display()
        );
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DataSource, NutrientProfile, NutritionRecord};
    use tempfile::TempDir;

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/data/off_data.json");
        let records = vec![NutritionRecord {
            product_name: Some("Pan integral".to_string()),
            calories: 247.0,
            fat: 3.4,
            carbohydrates: 41.0,
            protein: 13.0,
            source: DataSource::OpenFoodFacts,
            fetched_at: None,
        }];
        save_json(&path, &records).unwrap();

        let loaded: Vec<NutritionRecord> = load_json(&path).unwrap();
        assert_eq!(loaded, records);
        // pretty printed
        assert!(fs::read_to_string(&path).unwrap().contains("\n  "));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result: StoreResult<Value> = load_json(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(StoreError::Io(_))));
    }

    #[test]
    fn test_load_invalid_json_is_json_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();
        let result: StoreResult<Value> = load_json(&path);
        assert!(matches!(result, Err(StoreError::Json(_))));
    }

    #[test]
    fn test_catalog_file_keeps_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ingredientes_usda.json");
        let catalog: ProfileCatalog = vec![
            (
                "garbanzo".to_string(),
                NutrientProfile::from_pairs([("Protein", 20.5), ("Energy", 378.0)]),
            ),
            (
                "lenteja".to_string(),
                NutrientProfile::from_pairs([("Protein", 24.6)]),
            ),
        ]
        .into_iter()
        .collect();
        save_catalog(&path, &catalog).unwrap();

        let loaded = load_catalog(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get("lenteja").unwrap().get("Protein"), 24.6);
    }

    #[test]
    fn test_catalog_keeps_file_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ingredientes_usda.json");
        fs::write(
            &path,
            r#"{"zanahoria": {"Protein": 0.9}, "arroz": {"Protein": 6.5}, "lenteja": {"Protein": 24.6}}"#,
        )
        .unwrap();

        let loaded = load_catalog(&path).unwrap();
        let names: Vec<&str> = loaded.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["zanahoria", "arroz", "lenteja"]);

        save_catalog(&path, &loaded).unwrap();
        let reloaded = load_catalog(&path).unwrap();
        let names: Vec<&str> = reloaded.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["zanahoria", "arroz", "lenteja"]);
    }

    #[test]
    fn test_catalog_must_be_an_object() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(matches!(load_catalog(&path), Err(StoreError::Shape(_))));
    }

    #[test]
    fn test_load_loose_ingredients() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("aceites.json");
        fs::write(
            &path,
            r#"[
                {"ingrediente": "aceite de oliva", "energia": 884, "grasas": 100},
                "stray",
                {"ingrediente": "aceite de girasol", "energia": 884, "grasas": 100}
            ]"#,
        )
        .unwrap();

        let records = load_ingredients(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].name, "aceite de girasol");
        assert_eq!(records[0].profile.get("grasas"), 100.0);
    }
}

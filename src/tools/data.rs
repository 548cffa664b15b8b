//! Data Tools
//!
//! Fetching from Open Food Facts and USDA, normalization of the saved
//! records, and regressor training/prediction. Everything here blocks on
//! network or disk.

use serde::Serialize;

use crate::config::AssistantConfig;
use crate::models::{NutrientProfile, NutritionRecord, ProductNutrients, ProfileCatalog};
use crate::nutrition;
use crate::regressor::{self, RegressorConfig};
use crate::sources::{usda_nutrient_map, OpenFoodFactsClient, UsdaClient};
use crate::store;

/// Response for collect_data
#[derive(Debug, Serialize)]
pub struct CollectResponse {
    pub off_records: usize,
    pub usda_records: usize,
    pub off_path: String,
    pub usda_path: String,
}

/// Response for usda_lookup
#[derive(Debug, Serialize)]
pub struct UsdaLookupResponse {
    pub ingredient: String,
    pub nutrients: NutrientProfile,
    /// Catalog file the profile was written to, if saved
    pub saved_to: Option<String>,
}

/// Response for normalize_data
#[derive(Debug, Serialize)]
pub struct NormalizeResponse {
    pub off_records: usize,
    pub usda_records: usize,
    /// Columns: calories, fat, carbohydrates, protein
    pub rows: Vec<Vec<f64>>,
}

/// Response for train_regressor
#[derive(Debug, Serialize)]
pub struct TrainResponse {
    pub samples: usize,
    pub epochs: usize,
    pub first_loss: Option<f64>,
    pub final_loss: Option<f64>,
    pub model_path: Option<String>,
}

/// Response for predict
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub inputs: Vec<f64>,
    pub prediction: f64,
}

/// Look up a product by barcode on Open Food Facts
pub fn lookup_product(config: &AssistantConfig, barcode: &str) -> Result<ProductNutrients, String> {
    let client = OpenFoodFactsClient::new(&config.sources)
        .map_err(|e| format!("Failed to create client: {}", e))?;
    client
        .product(barcode)
        .map_err(|e| format!("Failed to look up product {}: {}", barcode, e))
}

/// Fetch Open Food Facts and USDA listings and write them to the data
/// directory
pub fn collect_data(config: &AssistantConfig, page_size: Option<u32>) -> Result<CollectResponse, String> {
    let page_size = page_size.unwrap_or(config.sources.page_size);

    let off = OpenFoodFactsClient::new(&config.sources)
        .map_err(|e| format!("Failed to create client: {}", e))?;
    let off_records = off
        .list_products(page_size)
        .map_err(|e| format!("Failed to fetch Open Food Facts products: {}", e))?;

    let usda = UsdaClient::new(&config.sources)
        .map_err(|e| format!("Failed to create client: {}", e))?;
    let usda_records = usda
        .list_foods(page_size)
        .map_err(|e| format!("Failed to fetch USDA foods: {}", e))?;

    let off_path = config.paths.off_data();
    let usda_path = config.paths.usda_data();
    store::save_json(&off_path, &off_records).map_err(|e| format!("Failed to save records: {}", e))?;
    store::save_json(&usda_path, &usda_records).map_err(|e| format!("Failed to save records: {}", e))?;

    Ok(CollectResponse {
        off_records: off_records.len(),
        usda_records: usda_records.len(),
        off_path: off_path.display().to_string(),
        usda_path: usda_path.display().to_string(),
    })
}

/// Search USDA for an ingredient; optionally add its profile to the
/// ingredient catalog
pub fn usda_lookup(config: &AssistantConfig, ingredient: &str, save: bool) -> Result<UsdaLookupResponse, String> {
    let ingredient = ingredient.trim();
    if ingredient.is_empty() {
        return Err("Ingredient name cannot be empty".to_string());
    }

    let client = UsdaClient::new(&config.sources)
        .map_err(|e| format!("Failed to create client: {}", e))?;
    let body = client
        .search_foods(ingredient, config.sources.page_size.min(200))
        .map_err(|e| format!("Failed to search USDA for '{}': {}", ingredient, e))?;
    let nutrients = usda_nutrient_map(&body);

    let saved_to = if save {
        if nutrients.is_empty() {
            return Err(format!("USDA returned no nutrients for '{}'", ingredient));
        }
        let path = config.paths.ingredient_catalog();
        let mut catalog = if path.exists() {
            store::load_catalog(&path).map_err(|e| format!("Failed to load catalog: {}", e))?
        } else {
            ProfileCatalog::new()
        };
        catalog.insert(ingredient, nutrients.clone());
        store::save_catalog(&path, &catalog).map_err(|e| format!("Failed to save catalog: {}", e))?;
        Some(path.display().to_string())
    } else {
        None
    };

    Ok(UsdaLookupResponse {
        ingredient: ingredient.to_string(),
        nutrients,
        saved_to,
    })
}

/// Normalize the records written by [`collect_data`]
pub fn normalize_data(config: &AssistantConfig) -> Result<NormalizeResponse, String> {
    let off: Vec<NutritionRecord> = store::load_json(&config.paths.off_data())
        .map_err(|e| format!("Failed to load {}: {}", config.paths.off_data().display(), e))?;
    let usda: Vec<NutritionRecord> = store::load_json(&config.paths.usda_data())
        .map_err(|e| format!("Failed to load {}: {}", config.paths.usda_data().display(), e))?;

    let rows = nutrition::normalize_records(&off, &usda).map_err(|e| format!("Failed to normalize: {}", e))?;

    Ok(NormalizeResponse {
        off_records: off.len(),
        usda_records: usda.len(),
        rows,
    })
}

/// Train the regressor (on the demonstration set when no data is given)
/// and optionally store it in the data directory
pub fn train_regressor(
    config: &AssistantConfig,
    inputs: Option<Vec<Vec<f64>>>,
    labels: Option<Vec<f64>>,
    epochs: Option<usize>,
    save: bool,
) -> Result<TrainResponse, String> {
    let (inputs, labels) = match (inputs, labels) {
        (Some(inputs), Some(labels)) => (inputs, labels),
        (None, None) => regressor::sample_training_set(),
        _ => return Err("Provide both inputs and labels, or neither".to_string()),
    };
    let defaults = RegressorConfig::default();
    let epochs = epochs.unwrap_or(defaults.epochs);
    if epochs > config.max_epochs {
        return Err(format!(
            "epochs must be at most {} (got {})",
            config.max_epochs, epochs
        ));
    }
    let regressor_config = RegressorConfig { epochs, ..defaults };

    let model = regressor::train(&inputs, &labels, &regressor_config)
        .map_err(|e| format!("Failed to train regressor: {}", e))?;

    let model_path = if save {
        let path = config.paths.model();
        regressor::save_checkpoint(&model, &path).map_err(|e| format!("Failed to save model: {}", e))?;
        Some(path.display().to_string())
    } else {
        None
    };

    Ok(TrainResponse {
        samples: inputs.len(),
        epochs: regressor_config.epochs,
        first_loss: model.loss_history().first().copied(),
        final_loss: model.final_loss(),
        model_path,
    })
}

/// Predict with the stored regressor
pub fn predict(config: &AssistantConfig, inputs: Vec<f64>) -> Result<PredictResponse, String> {
    let path = config.paths.model();
    let model = regressor::load_checkpoint(&path)
        .map_err(|e| format!("Failed to load model {} (train one first): {}", path.display(), e))?;
    let prediction = model
        .predict(&inputs)
        .map_err(|e| format!("Failed to predict: {}", e))?;
    Ok(PredictResponse { inputs, prediction })
}

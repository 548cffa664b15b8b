//! Runtime configuration
//!
//! Every tunable the heuristics and fetchers use lives here and is passed
//! down explicitly. Values come from `TRIVO_*` environment variables with
//! defaults for everything.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::nutrition::{NutrientKeys, SimilarityTolerance, WaterProfile};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: '{value}' ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Open Food Facts default endpoint
pub const DEFAULT_OFF_BASE_URL: &str = "https://world.openfoodfacts.org";
/// USDA FoodData Central default endpoint
pub const DEFAULT_USDA_BASE_URL: &str = "https://api.nal.usda.gov/fdc/v1";

/// Upper bound on regressor epochs a single training request may ask for
pub const DEFAULT_MAX_EPOCHS: usize = 5_000;

/// External nutrition API settings
#[derive(Debug, Clone, Serialize)]
pub struct SourceConfig {
    pub off_base_url: String,
    pub usda_base_url: String,
    #[serde(skip_serializing)]
    pub usda_api_key: String,
    /// Records requested per listing call
    pub page_size: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            off_base_url: DEFAULT_OFF_BASE_URL.to_string(),
            usda_base_url: DEFAULT_USDA_BASE_URL.to_string(),
            usda_api_key: "DEMO_KEY".to_string(),
            page_size: 10,
        }
    }
}

/// Data file locations
#[derive(Debug, Clone, Serialize)]
pub struct DataPaths {
    pub data_dir: PathBuf,
}

impl DataPaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Products listed from Open Food Facts
    pub fn off_data(&self) -> PathBuf {
        self.data_dir.join("off_data.json")
    }

    /// Foods listed from USDA
    pub fn usda_data(&self) -> PathBuf {
        self.data_dir.join("usda_data.json")
    }

    /// Reference catalog of ingredient profiles (name -> nutrients)
    pub fn ingredient_catalog(&self) -> PathBuf {
        self.data_dir.join("ingredientes_usda.json")
    }

    /// Last trained regressor
    pub fn model(&self) -> PathBuf {
        self.data_dir.join("regressor.json")
    }

    pub fn resolve(&self, file_name: &str) -> PathBuf {
        let path = Path::new(file_name);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }
}

/// Complete assistant configuration
#[derive(Debug, Clone, Serialize)]
pub struct AssistantConfig {
    pub paths: DataPaths,
    pub similarity_tolerance: SimilarityTolerance,
    pub water: WaterProfile,
    pub nutrient_keys: NutrientKeys,
    pub sources: SourceConfig,
    pub max_epochs: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            paths: DataPaths::new(default_data_dir()),
            similarity_tolerance: SimilarityTolerance::default(),
            water: WaterProfile::default(),
            nutrient_keys: NutrientKeys::default(),
            sources: SourceConfig::default(),
            max_epochs: DEFAULT_MAX_EPOCHS,
        }
    }
}

impl AssistantConfig {
    /// Load from the process environment
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load from any variable source (tests pass a closure over a map)
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup("TRIVO_DATA_DIR") {
            config.paths = DataPaths::new(dir);
        }
        if let Some(key) = lookup("TRIVO_USDA_API_KEY") {
            config.sources.usda_api_key = key;
        }
        if let Some(url) = lookup("TRIVO_USDA_BASE_URL") {
            config.sources.usda_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = lookup("TRIVO_OFF_BASE_URL") {
            config.sources.off_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(raw) = lookup("TRIVO_PAGE_SIZE") {
            config.sources.page_size = match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: "TRIVO_PAGE_SIZE",
                        value: raw,
                        reason: "expected a positive integer".to_string(),
                    })
                }
            };
        }
        if let Some(raw) = lookup("TRIVO_MAX_EPOCHS") {
            config.max_epochs = match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: "TRIVO_MAX_EPOCHS",
                        value: raw,
                        reason: "expected a positive integer".to_string(),
                    })
                }
            };
        }
        if let Some(raw) = lookup("TRIVO_SIMILARITY_TOLERANCE") {
            let parsed = raw.trim().parse::<f64>().map_err(|e| ConfigError::InvalidValue {
                var: "TRIVO_SIMILARITY_TOLERANCE",
                value: raw.clone(),
                reason: e.to_string(),
            })?;
            config.similarity_tolerance =
                SimilarityTolerance::new(parsed).map_err(|e| ConfigError::InvalidValue {
                    var: "TRIVO_SIMILARITY_TOLERANCE",
                    value: raw.clone(),
                    reason: e.to_string(),
                })?;
        }
        if let Some(raw) = lookup("TRIVO_HARD_WATER_REGIONS") {
            config.water.hard_water_regions = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(raw) = lookup("TRIVO_NUTRIENT_LANGUAGE") {
            config.nutrient_keys = match raw.trim().to_lowercase().as_str() {
                "es" | "spanish" => NutrientKeys::spanish(),
                "en" | "english" => NutrientKeys::default(),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: "TRIVO_NUTRIENT_LANGUAGE",
                        value: raw,
                        reason: "expected 'en' or 'es'".to_string(),
                    })
                }
            };
        }

        Ok(config)
    }
}

/// `data/` next to the project root when running from `target/{debug,release}`,
/// otherwise next to the executable
fn default_data_dir() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(grandparent) = path.parent().and_then(Path::parent) {
            path = grandparent.to_path_buf();
        }
    }

    path.push("data");
    path
}

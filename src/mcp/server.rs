//! Trivo MCP Server Implementation
//!
//! Implements the MCP server with all Trivo tools.

use std::collections::BTreeMap;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::AssistantConfig;
use crate::models::{IngredientRecord, NutrientProfile, Recipe, Replacement, Replacements, Targets};
use crate::tools::status::StatusTracker;
use crate::tools::{adjust, data, matching};

/// Trivo MCP Service
#[derive(Clone)]
pub struct TrivoService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    config: Arc<AssistantConfig>,
    tool_router: ToolRouter<TrivoService>,
}

impl TrivoService {
    pub fn new(config: AssistantConfig) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(config.clone()))),
            config: Arc::new(config),
            tool_router: Self::tool_router(),
        }
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Run a blocking tool (HTTP or disk) off the async executor
async fn run_blocking<T, F>(task: F) -> Result<CallToolResult, McpError>
where
    F: FnOnce() -> Result<T, String> + Send + 'static,
    T: Serialize + Send + 'static,
{
    let result = tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| McpError::internal_error(format!("Tool task failed: {}", e), None))?
        .map_err(|e| McpError::internal_error(e, None))?;
    json_result(&result)
}

// ============================================================================
// Shared Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct IngredientParam {
    /// Ingredient name
    pub name: String,
    /// Nutrient name -> amount
    #[serde(default)]
    pub nutrients: BTreeMap<String, f64>,
}

impl From<IngredientParam> for IngredientRecord {
    fn from(p: IngredientParam) -> Self {
        IngredientRecord::new(p.name, NutrientProfile::from(p.nutrients))
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RecipeParam {
    /// Optional recipe name
    pub name: Option<String>,
    /// Ingredient name -> quantity
    #[serde(default)]
    pub ingredients: BTreeMap<String, f64>,
    /// Nutrient name -> total
    #[serde(default)]
    pub nutrients: BTreeMap<String, f64>,
}

impl From<RecipeParam> for Recipe {
    fn from(p: RecipeParam) -> Self {
        Recipe {
            name: p.name,
            ingredients: p.ingredients,
            nutrients: NutrientProfile::from(p.nutrients),
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ReplacementParam {
    /// Substitute ingredient name
    pub name: String,
    /// Quantity of the substitute
    pub quantity: f64,
}

// ============================================================================
// Matching Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CompareProfilesParams {
    /// Reference profile; every nutrient listed here is checked
    pub reference: BTreeMap<String, f64>,
    /// Candidate profile; missing nutrients count as 0
    pub candidate: BTreeMap<String, f64>,
    /// Per-nutrient tolerance (default from configuration, 5)
    pub tolerance: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FindReplacementsParams {
    /// Ingredient to replace
    pub target: IngredientParam,
    /// Candidate ingredients, in preference order
    pub candidates: Vec<IngredientParam>,
    /// Per-nutrient tolerance (default from configuration, 5)
    pub tolerance: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CatalogReplacementsParams {
    /// Query profile; every nutrient listed here is checked
    pub profile: BTreeMap<String, f64>,
    /// Catalog file in the data directory (default ingredientes_usda.json)
    pub catalog_file: Option<String>,
    /// Per-nutrient tolerance (default from configuration, 5)
    pub tolerance: Option<f64>,
}

// ============================================================================
// Adjustment Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AdjustNutriScoreParams {
    /// Nutrient totals of the recipe
    pub nutrients: BTreeMap<String, f64>,
    /// Rule set: "base" (default) or "a_plus"
    pub level: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AdjustToTargetsParams {
    pub recipe: RecipeParam,
    /// Ingredient name -> registered replacement
    #[serde(default)]
    pub replacements: BTreeMap<String, ReplacementParam>,
    /// Ingredient name -> target quantity
    #[serde(default)]
    pub ingredient_targets: BTreeMap<String, f64>,
    /// Nutrient name -> target total
    #[serde(default)]
    pub nutrient_targets: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AdjustForWaterParams {
    /// Water source (region name, exact match)
    pub source: String,
    /// Calcium in mg/L (default: simulated reading for the source)
    pub calcium_mg_l: Option<f64>,
    pub recipe: RecipeParam,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LocalImpactParams {
    /// Ingredient name
    pub ingredient: String,
    /// Ingredient nutrient profile
    pub nutrients: BTreeMap<String, f64>,
    /// Local equivalent's nutrient profile
    pub local: BTreeMap<String, f64>,
}

// ============================================================================
// Data Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LookupProductParams {
    /// Product barcode (digits)
    pub barcode: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UsdaLookupParams {
    /// Ingredient to search for
    pub ingredient: String,
    /// Store the nutrient map in the ingredient catalog (default false)
    #[serde(default)]
    pub save: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CollectDataParams {
    /// Records per source (default from configuration, 10)
    pub page_size: Option<u32>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct TrainRegressorParams {
    /// Input rows of five values (default: demonstration set)
    pub inputs: Option<Vec<Vec<f64>>>,
    /// One label per input row
    pub labels: Option<Vec<f64>>,
    /// Training epochs (default 100, at most TRIVO_MAX_EPOCHS)
    pub epochs: Option<usize>,
    /// Store the model in the data directory (default true)
    #[serde(default = "default_save_model")]
    pub save: bool,
}

fn default_save_model() -> bool { true }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PredictParams {
    /// energia, proteinas, grasas, carbohidratos, fibra
    pub inputs: Vec<f64>,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl TrivoService {
    // --- Status ---

    #[tool(description = "Get the current status of the Trivo service including build info, data files, configuration and process information")]
    async fn trivo_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status();
        json_result(&status)
    }

    #[tool(description = "Get instructions for using the Trivo tools. Call this first when unsure how profiles, recipes and adjustments are shaped.")]
    fn assistant_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::ASSISTANT_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(ASSISTANT_INSTRUCTIONS)]))
    }

    // --- Matching ---

    #[tool(description = "Check whether a candidate nutrient profile is within tolerance of a reference profile on every reference nutrient")]
    fn compare_profiles(&self, Parameters(p): Parameters<CompareProfilesParams>) -> Result<CallToolResult, McpError> {
        let result = matching::compare_profiles(
            &self.config,
            &NutrientProfile::from(p.reference),
            &NutrientProfile::from(p.candidate),
            p.tolerance,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Filter candidate ingredients to those whose nutrient profile matches the target ingredient's")]
    fn find_replacements(&self, Parameters(p): Parameters<FindReplacementsParams>) -> Result<CallToolResult, McpError> {
        let target = IngredientRecord::from(p.target);
        let candidates: Vec<IngredientRecord> = p.candidates.into_iter().map(IngredientRecord::from).collect();
        let result = matching::find_replacements(&self.config, &target, &candidates, p.tolerance)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "List ingredient catalog entries matched by a query nutrient profile")]
    async fn catalog_replacements(&self, Parameters(p): Parameters<CatalogReplacementsParams>) -> Result<CallToolResult, McpError> {
        let config = Arc::clone(&self.config);
        run_blocking(move || {
            matching::catalog_replacements(
                &config,
                &NutrientProfile::from(p.profile),
                p.catalog_file.as_deref(),
                p.tolerance,
            )
        })
        .await
    }

    // --- Adjustment ---

    #[tool(description = "Apply NutriScore heuristics (base or a_plus rule set) to recipe nutrient totals")]
    fn adjust_nutriscore(&self, Parameters(p): Parameters<AdjustNutriScoreParams>) -> Result<CallToolResult, McpError> {
        let result = adjust::adjust_nutriscore(&self.config, &NutrientProfile::from(p.nutrients), p.level.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Apply registered replacements, then move ingredient quantities and nutrient totals to their targets")]
    fn adjust_to_targets(&self, Parameters(p): Parameters<AdjustToTargetsParams>) -> Result<CallToolResult, McpError> {
        let recipe = Recipe::from(p.recipe);
        let replacements: Replacements = p
            .replacements
            .into_iter()
            .map(|(ingredient, r)| (ingredient, Replacement { name: r.name, quantity: r.quantity }))
            .collect();
        let targets = Targets {
            ingredients: p.ingredient_targets,
            nutrients: p.nutrient_targets,
        };
        let result = adjust::adjust_to_targets(&recipe, &replacements, &targets)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Adjust recipe water and salt for the hardness of the local water source")]
    fn adjust_for_water(&self, Parameters(p): Parameters<AdjustForWaterParams>) -> Result<CallToolResult, McpError> {
        let recipe = Recipe::from(p.recipe);
        let result = adjust::adjust_for_water(&self.config, &p.source, p.calcium_mg_l, &recipe)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Per-nutrient difference between an ingredient and its locally sourced equivalent")]
    fn local_impact(&self, Parameters(p): Parameters<LocalImpactParams>) -> Result<CallToolResult, McpError> {
        let result = adjust::local_impact(
            &p.ingredient,
            &NutrientProfile::from(p.nutrients),
            &NutrientProfile::from(p.local),
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Data ---

    #[tool(description = "Look up a product on Open Food Facts by barcode and return its normalized nutrients")]
    async fn lookup_product(&self, Parameters(p): Parameters<LookupProductParams>) -> Result<CallToolResult, McpError> {
        let config = Arc::clone(&self.config);
        run_blocking(move || data::lookup_product(&config, &p.barcode)).await
    }

    #[tool(description = "Search USDA FoodData Central for an ingredient and return the first food's nutrients; optionally store them in the ingredient catalog")]
    async fn usda_lookup(&self, Parameters(p): Parameters<UsdaLookupParams>) -> Result<CallToolResult, McpError> {
        let config = Arc::clone(&self.config);
        run_blocking(move || data::usda_lookup(&config, &p.ingredient, p.save)).await
    }

    #[tool(description = "Fetch product listings from Open Food Facts and USDA and save them to the data directory")]
    async fn collect_data(&self, Parameters(p): Parameters<CollectDataParams>) -> Result<CallToolResult, McpError> {
        let config = Arc::clone(&self.config);
        run_blocking(move || data::collect_data(&config, p.page_size)).await
    }

    #[tool(description = "Min-max normalize the collected records (calories, fat, carbohydrates, protein)")]
    async fn normalize_data(&self) -> Result<CallToolResult, McpError> {
        let config = Arc::clone(&self.config);
        run_blocking(move || data::normalize_data(&config)).await
    }

    #[tool(description = "Train the five-input nutrient regressor (demonstration data when none is given)")]
    async fn train_regressor(&self, Parameters(p): Parameters<TrainRegressorParams>) -> Result<CallToolResult, McpError> {
        let config = Arc::clone(&self.config);
        run_blocking(move || data::train_regressor(&config, p.inputs, p.labels, p.epochs, p.save)).await
    }

    #[tool(description = "Predict with the stored regressor from five nutrient values")]
    async fn predict(&self, Parameters(p): Parameters<PredictParams>) -> Result<CallToolResult, McpError> {
        let config = Arc::clone(&self.config);
        run_blocking(move || data::predict(&config, p.inputs)).await
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for TrivoService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "trivo".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Trivo Recipe Nutrition Assistant".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Trivo - recipe nutrition assistant. \
                 IMPORTANT: Call assistant_instructions first. \
                 Matching: compare_profiles, find_replacements, catalog_replacements. \
                 Recipes: adjust_nutriscore, adjust_to_targets, adjust_for_water, local_impact. \
                 Data: lookup_product, usda_lookup, collect_data, normalize_data. \
                 Regressor: train_regressor, predict. \
                 Status: trivo_status."
                    .into(),
            ),
        }
    }
}

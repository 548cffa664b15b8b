//! End-to-end walk through the assistant on a sample bread recipe
//!
//! Usage: recipe_demo [BARCODE]
//!
//! Network steps (barcode lookup) and file steps (catalog search) are
//! reported and skipped when they fail.

use std::collections::BTreeMap;

use tracing_subscriber::EnvFilter;

use trivo::config::AssistantConfig;
use trivo::models::{IngredientRecord, NutrientProfile, Recipe};
use trivo::nutrition::{self, NutrientKeys, RuleSet};
use trivo::regressor::{self, RegressorConfig};
use trivo::tools::{data, matching};

const DEFAULT_BARCODE: &str = "1234567890123";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("trivo=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let mut config = AssistantConfig::from_env()?;
    // The sample recipe uses Spanish nutrient names
    config.nutrient_keys = NutrientKeys::spanish();
    let barcode = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_BARCODE.to_string());

    // 1. Product lookup
    let product = match data::lookup_product(&config, &barcode) {
        Ok(product) => {
            println!("Ingredients: {}", product.ingredients_text);
            println!("Nutrients: {}", serde_json::to_string(&product.nutrients)?);
            Some(product)
        }
        Err(e) => {
            tracing::warn!("Skipping product lookup: {}", e);
            None
        }
    };

    // 2. Regressor
    let (inputs, labels) = regressor::sample_training_set();
    let model = regressor::train(&inputs, &labels, &RegressorConfig::default())?;
    println!(
        "Regressor trained on {} rows, final loss {:.3}",
        inputs.len(),
        model.final_loss().unwrap_or(f64::NAN)
    );
    if let Some(product) = &product {
        println!("Predicted score for {}: {:.2}", barcode, model.predict(&product.training_features())?);
    }

    // 3. Replacements
    let oil = |name: &str| {
        IngredientRecord::new(
            name,
            NutrientProfile::from_pairs([
                ("energia", 884.0),
                ("proteinas", 0.0),
                ("grasas", 100.0),
                ("carbohidratos", 0.0),
                ("fibra", 0.0),
            ]),
        )
    };
    let candidates = vec![oil("aceite de oliva"), oil("aceite de girasol")];
    let replacements = nutrition::find_replacements(&oil("aceite de oliva"), &candidates, config.similarity_tolerance)?;
    let names: Vec<&str> = replacements.iter().map(|r| r.name.as_str()).collect();
    println!("Best replacements found: {:?}", names);

    // 4. Water hardness
    let source = "Valencia";
    let calcium = config.water.calcium_for(source);
    let mixed: BTreeMap<String, f64> = [
        ("agua", 200.0),
        ("harina", 500.0),
        ("sal", 10.0),
        ("azúcar", 40.0),
        ("fibra", 4.0),
        ("calorías", 350.0),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    let recipe = Recipe::split_mixed(&mixed, config.nutrient_keys.all());
    let adjusted = nutrition::adjust_texture_for_water(source, calcium, &recipe, &config.water)?;
    println!(
        "Recipe adjusted for {} water ({} mg/L calcium): {}",
        source,
        calcium,
        serde_json::to_string(&adjusted)?
    );

    // 5. Local impact
    let local_rice = NutrientProfile::from_pairs([
        ("fibra", 1.8),
        ("proteinas", 7.0),
        ("carbohidratos", 78.0),
        ("calorias", 365.0),
    ]);
    let rice = NutrientProfile::from_pairs([
        ("fibra", 2.0),
        ("proteinas", 6.5),
        ("carbohidratos", 80.0),
        ("calorias", 370.0),
    ]);
    println!(
        "Local nutrient impact: {}",
        serde_json::to_string(&nutrition::local_impact(&rice, &local_rice))?
    );

    // 6. NutriScore A+
    let a_plus = RuleSet::a_plus(&config.nutrient_keys).apply_to_recipe(&adjusted);
    println!("Recipe adjusted for NutriScore A+: {}", serde_json::to_string(&a_plus)?);

    // 7. Catalog replacements
    let query = NutrientProfile::from_pairs([
        ("energia", 642.0),
        ("proteinas", 33.5),
        ("grasas", 10.6),
        ("carbohidratos", 108.0),
        ("fibra", 30.0),
    ]);
    match matching::catalog_replacements(&config, &query, None, None) {
        Ok(found) => println!("Catalog replacements: {:?}", found.matches),
        Err(e) => tracing::warn!("Skipping catalog search: {}", e),
    }

    Ok(())
}

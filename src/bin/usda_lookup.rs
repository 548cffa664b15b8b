//! Search USDA for one ingredient and store its nutrients in the catalog
//!
//! Usage: usda_lookup <INGREDIENT>

use tracing_subscriber::EnvFilter;

use trivo::config::AssistantConfig;
use trivo::tools::data;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("trivo=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let ingredient = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if ingredient.trim().is_empty() {
        eprintln!("Usage: usda_lookup <INGREDIENT>");
        std::process::exit(2);
    }

    let config = AssistantConfig::from_env()?;
    let result = data::usda_lookup(&config, &ingredient, true)?;

    println!("{}:", result.ingredient);
    for (nutrient, amount) in result.nutrients.iter() {
        println!("  {}: {}", nutrient, amount);
    }
    if let Some(path) = result.saved_to {
        println!("Saved to {}", path);
    }

    Ok(())
}

//! Fetch Open Food Facts and USDA listings into the data directory
//!
//! Usage: collect_data [PAGE_SIZE]

use tracing_subscriber::EnvFilter;

use trivo::config::AssistantConfig;
use trivo::tools::data;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("trivo=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let config = AssistantConfig::from_env()?;
    let page_size = match std::env::args().nth(1) {
        Some(arg) => Some(arg.parse::<u32>().map_err(|e| format!("Invalid page size '{}': {}", arg, e))?),
        None => None,
    };

    let collected = data::collect_data(&config, page_size)?;
    println!(
        "Saved {} Open Food Facts products to {}",
        collected.off_records, collected.off_path
    );
    println!(
        "Saved {} USDA foods to {}",
        collected.usda_records, collected.usda_path
    );

    let normalized = data::normalize_data(&config)?;
    println!("Normalized {} rows (calories, fat, carbohydrates, protein)", normalized.rows.len());

    Ok(())
}

//! Trivo
//!
//! An MCP server for recipe nutrition assistance.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use trivo::build_info;
use trivo::config::AssistantConfig;
use trivo::mcp::TrivoService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("trivo=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    // Print startup banner to stderr
    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    let config = AssistantConfig::from_env()?;
    eprintln!("Data directory: {}", config.paths.data_dir.display());

    // Ensure data directory exists
    std::fs::create_dir_all(&config.paths.data_dir)?;

    // Create the Trivo service
    let service = TrivoService::new(config);

    // Create stdio transport
    let transport = (stdin(), stdout());

    // Start the MCP server
    let server = service.serve(transport).await?;

    // Wait for the server to complete
    server.waiting().await?;

    Ok(())
}

//! `doctor` — diagnose configuration and connectivity.

use anyhow::Context;
use talentscout_config::AppConfig;

pub async fn run() -> anyhow::Result<()> {
    println!("Talentscout doctor\n");

    let config = AppConfig::load().context("Failed to load configuration")?;
    println!("✓ Configuration loaded");

    match config.validate() {
        Ok(()) => println!("✓ Configuration valid"),
        Err(e) => println!("✗ Configuration invalid: {e}"),
    }

    if config.has_api_key() {
        println!("✓ LLM API key present ({})", config.llm.model);
    } else {
        println!("✗ No LLM API key — set TALENTSCOUT_API_KEY or OPENAI_API_KEY");
    }

    print!("  Checking database... ");
    match talentscout_store::postgres::connect(&config.database.url, 1).await {
        Ok(_pool) => println!("✓ reachable"),
        Err(e) => println!("✗ {e}"),
    }

    println!("  Vector index: {}", config.vector_index.base_url);
    match &config.graph {
        Some(graph) => println!("  Graph store: {}", graph.url),
        None => println!("  Graph store: not configured"),
    }

    Ok(())
}

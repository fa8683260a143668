//! `serve` — start the HTTP gateway.

use anyhow::Context;
use talentscout_config::AppConfig;

pub async fn run(port: Option<u16>) -> anyhow::Result<()> {
    let mut config = AppConfig::load().context("Failed to load configuration")?;

    if let Some(port) = port {
        config.gateway.port = port;
    }

    talentscout_gateway::start(config)
        .await
        .map_err(|e| anyhow::anyhow!("Gateway failed: {e}"))
}

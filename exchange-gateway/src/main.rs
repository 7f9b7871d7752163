//! Exchange Gateway - Main entry point

use exchange_core::{GatewayConfig, ModuleTable};
use exchange_gateway::Gateway;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let config = GatewayConfig::from_env()?;

    // Initialize tracing; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Handler modules are installed by the embedding deployment
    let modules = ModuleTable::new();

    let (gateway, handle) = Gateway::new(config, modules)?;
    let task = tokio::spawn(gateway.run());

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");

    // Dropping the last handle lets the queue drain and the loop exit
    drop(handle);
    task.await?;

    Ok(())
}

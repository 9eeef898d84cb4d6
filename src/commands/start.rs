use anyhow::Result;
use colored::Colorize;
use hoststats::config::{self, ConfigOverrides};
use hoststats::{init_tracing, server};
use std::path::Path;
use tracing::info;

/// Execute the start command
///
/// This will:
/// 1. Load configuration (file, environment, then command-line flags)
/// 2. Initialize logging with the configured level and format
/// 3. Start the server (blocks until shutdown)
pub async fn execute(config_path: &Path, overrides: &ConfigOverrides) -> Result<()> {
    let cfg = config::load_config(config_path, overrides)?;

    init_tracing(&cfg.server.log_level, cfg.server.log_format == "json");
    println!("{}", "Starting hoststats...".green());
    info!(
        host = %cfg.server.host,
        port = cfg.server.port,
        database = %cfg.ledger.database_path,
        "Configuration loaded"
    );

    server::start_server(cfg).await?;

    Ok(())
}

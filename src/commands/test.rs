use anyhow::Result;
use colored::Colorize;
use hoststats::config::{self, ConfigOverrides};
use std::path::Path;
use tracing::info;

/// Execute the test command
///
/// This validates the configuration without starting the server
pub fn execute(config_path: &Path) -> Result<()> {
    println!("{}", "Testing configuration...".yellow());
    info!("Loading and validating configuration");

    // Load configuration (this will validate it)
    let cfg = config::load_config(config_path, &ConfigOverrides::default())?;

    println!("{}", "✓ Configuration test successful".green());
    println!();

    println!("{}", "Configuration Summary:".bold());
    println!(
        "  {}: {}{}",
        "Config File".cyan(),
        config_path.display(),
        if config_path.exists() {
            String::new()
        } else {
            format!(" {}", "(not found, using defaults)".dimmed())
        }
    );
    println!("  {}: {}:{}", "Server".cyan(), cfg.server.host, cfg.server.port);
    println!("  {}: {}", "Log Level".cyan(), cfg.server.log_level);
    println!("  {}: {}", "Log Format".cyan(), cfg.server.log_format);
    println!();

    let db_path = Path::new(&cfg.ledger.database_path);
    let parent_exists = db_path.parent().map_or(true, |p| p.as_os_str().is_empty() || p.exists());
    println!("  {}: {}", "Ledger".cyan(), db_path.display());
    println!(
        "    Database file: {}",
        if db_path.exists() {
            "present".green()
        } else {
            "will be created".yellow()
        }
    );
    println!(
        "    Parent directory: {}",
        match (parent_exists, cfg.ledger.create_parent_dir) {
            (true, _) => "present".green(),
            (false, true) => "will be created".yellow(),
            (false, false) => "missing (ledger will be unavailable)".red(),
        }
    );

    info!("Configuration validation completed successfully");
    Ok(())
}

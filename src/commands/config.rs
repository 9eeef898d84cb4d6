use anyhow::Result;
use colored::Colorize;
use hoststats::config::{self, ConfigOverrides};
use std::path::Path;
use tracing::info;

/// Execute the config show command
///
/// Displays the effective configuration after every layer is applied
pub fn show(config_path: &Path) -> Result<()> {
    println!("{}", "Loading configuration...".yellow());
    info!("Loading configuration for display");

    let cfg = config::load_config(config_path, &ConfigOverrides::default())?;

    println!("{}", "Current Configuration:".green().bold());
    println!();

    // Serialize to TOML format
    let toml_string = toml::to_string_pretty(&cfg)?;
    println!("{}", toml_string);

    info!("Configuration displayed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use hoststats::config::Config;

    #[test]
    fn test_default_config_serializes_to_toml() {
        let rendered = toml::to_string_pretty(&Config::default()).unwrap();

        assert!(rendered.contains("[server]"));
        assert!(rendered.contains("port = 8080"));
        assert!(rendered.contains("[ledger]"));
        assert!(rendered.contains("database_path = \"/var/lib/hoststats/requests.db\""));
    }
}

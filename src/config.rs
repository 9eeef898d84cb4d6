use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::Path;

/// Prefix for environment overrides, e.g. `HOSTSTATS__SERVER__PORT=9090`
pub const ENV_PREFIX: &str = "HOSTSTATS";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Bind address for the web listener
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Default `tracing` filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// `text` or `json`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

/// Request ledger storage
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LedgerConfig {
    /// SQLite file holding the servers and requests tables
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Create the database's parent directory when it is missing
    #[serde(default)]
    pub create_parent_dir: bool,

    /// Hostname this instance registers under instead of the system's
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    /// IP this instance registers under instead of the resolved one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            create_parent_dir: false,
            hostname: None,
            ip: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_database_path() -> String {
    "/var/lib/hoststats/requests.db".to_string()
}

/// Command-line values that take precedence over every other source
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub database_path: Option<String>,
    pub create_parent_dir: bool,
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Load configuration
///
/// Priority: command-line overrides > environment (`HOSTSTATS__…`) >
/// config file (optional) > built-in defaults
pub fn load_config(path: &Path, overrides: &ConfigOverrides) -> anyhow::Result<Config> {
    let defaults = Config::default();

    let mut builder = config::Config::builder()
        .set_default("server.host", defaults.server.host)?
        .set_default("server.port", i64::from(defaults.server.port))?
        .set_default("server.log_level", defaults.server.log_level)?
        .set_default("server.log_format", defaults.server.log_format)?
        .set_default("ledger.database_path", defaults.ledger.database_path)?
        .set_default("ledger.create_parent_dir", defaults.ledger.create_parent_dir)?
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("ledger.database_path", overrides.database_path.clone())?
        .set_override_option("server.host", overrides.host.clone())?
        .set_override_option("server.port", overrides.port.map(i64::from))?;

    if overrides.create_parent_dir {
        builder = builder.set_override("ledger.create_parent_dir", true)?;
    }

    let cfg: Config = builder
        .build()
        .with_context(|| format!("Failed to read configuration from {}", path.display()))?
        .try_deserialize()?;

    validate_config(&cfg)?;
    Ok(cfg)
}

pub fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.server.host.is_empty() {
        anyhow::bail!("Server host cannot be empty");
    }

    if cfg.server.host.parse::<IpAddr>().is_err() {
        anyhow::bail!("Server host '{}' is not a valid IP address", cfg.server.host);
    }

    if cfg.server.port == 0 {
        anyhow::bail!("Server port must be between 1 and 65535");
    }

    if !matches!(cfg.server.log_format.as_str(), "text" | "json") {
        anyhow::bail!(
            "Unknown log format '{}', expected 'text' or 'json'",
            cfg.server.log_format
        );
    }

    if cfg.ledger.database_path.trim().is_empty() {
        anyhow::bail!("Ledger database path cannot be empty");
    }

    if cfg.ledger.hostname.as_deref().is_some_and(|h| h.trim().is_empty()) {
        anyhow::bail!("Ledger hostname override cannot be empty");
    }

    if let Some(ip) = &cfg.ledger.ip {
        if ip.parse::<IpAddr>().is_err() {
            anyhow::bail!("Ledger IP override '{}' is not a valid IP address", ip);
        }
    }

    Ok(())
}

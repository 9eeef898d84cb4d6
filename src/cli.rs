use clap::{Args, Parser, Subcommand};
use hoststats::config::ConfigOverrides;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "hoststats",
    version,
    about = "Host metrics pages with a persistent request ledger",
    long_about = "Serves host metrics on page load and records every request in a SQLite \
                  ledger shared by all instances, for exercising load balancers, stateful \
                  sets and persistent volumes."
)]
pub struct Cli {
    /// Configuration file path (optional, missing file means defaults)
    #[arg(long, default_value = "hoststats.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the web server (default)
    Start(StartArgs),

    /// Test configuration validity
    Test,

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Read the request ledger without starting the server
    Ledger {
        /// SQLite ledger file (overrides config)
        #[arg(short = 'f', long)]
        db_file: Option<String>,

        #[command(subcommand)]
        action: LedgerCommands,
    },

    /// Show version information
    Version,
}

#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct StartArgs {
    /// Full path to the SQLite file holding the request ledger
    #[arg(short = 'f', long)]
    pub db_file: Option<String>,

    /// Create the ledger file's parent directory when missing
    #[arg(short = 'c', long)]
    pub create_path: bool,

    /// IP address to bind the web listener to
    #[arg(long)]
    pub web_host: Option<String>,

    /// TCP port for the web listener
    #[arg(long)]
    pub web_port: Option<u16>,
}

impl StartArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            database_path: self.db_file.clone(),
            create_parent_dir: self.create_path,
            host: self.web_host.clone(),
            port: self.web_port,
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Display the effective configuration
    Show,
}

#[derive(Subcommand, Debug, Clone)]
pub enum LedgerCommands {
    /// List registered servers by id window
    Servers {
        #[arg(long, default_value_t = 1)]
        start: i64,

        #[arg(long, default_value_t = 10)]
        count: i64,
    },

    /// List logged requests by id window
    Requests {
        #[arg(long, default_value_t = 1)]
        start: i64,

        #[arg(long, default_value_t = 10)]
        count: i64,
    },

    /// List one server's requests by page number
    Server {
        server_id: i64,

        #[arg(long, default_value_t = 1)]
        page: i64,

        #[arg(long, default_value_t = 10)]
        count: i64,
    },
}

impl Cli {
    /// Get the command to execute, defaulting to Start if none provided
    pub fn get_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or(Commands::Start(StartArgs::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_start() {
        let cli = Cli {
            config: PathBuf::from("hoststats.toml"),
            command: None,
        };

        match cli.get_command() {
            Commands::Start(args) => assert_eq!(args, StartArgs::default()),
            _ => panic!("Expected Start command"),
        }
    }

    #[test]
    fn test_cli_parsing_start_flags() {
        let args = vec![
            "hoststats",
            "start",
            "-f",
            "/tmp/x/requests.db",
            "-c",
            "--web-host",
            "127.0.0.1",
            "--web-port",
            "9000",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.get_command() {
            Commands::Start(args) => {
                let overrides = args.overrides();
                assert_eq!(overrides.database_path.as_deref(), Some("/tmp/x/requests.db"));
                assert!(overrides.create_parent_dir);
                assert_eq!(overrides.host.as_deref(), Some("127.0.0.1"));
                assert_eq!(overrides.port, Some(9000));
            }
            _ => panic!("Expected Start command"),
        }
    }

    #[test]
    fn test_cli_rejects_bad_port() {
        let result = Cli::try_parse_from(vec!["hoststats", "start", "--web-port", "http"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parsing_config_show() {
        let args = vec!["hoststats", "--config", "/etc/hoststats.toml", "config", "show"];
        let cli = Cli::try_parse_from(args).unwrap();

        assert_eq!(cli.config, PathBuf::from("/etc/hoststats.toml"));
        assert!(matches!(
            cli.get_command(),
            Commands::Config {
                action: ConfigCommands::Show
            }
        ));
    }

    #[test]
    fn test_cli_parsing_ledger_server() {
        let args = vec!["hoststats", "ledger", "-f", "a.db", "server", "3", "--page", "2"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.get_command() {
            Commands::Ledger { db_file, action } => {
                assert_eq!(db_file.as_deref(), Some("a.db"));
                match action {
                    LedgerCommands::Server {
                        server_id,
                        page,
                        count,
                    } => {
                        assert_eq!((server_id, page, count), (3, 2, 10));
                    }
                    _ => panic!("Expected ledger server"),
                }
            }
            _ => panic!("Expected Ledger command"),
        }
    }
}

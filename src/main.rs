use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use hoststats::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = cli::Cli::parse();

    // The server configures logging from its own config; the offline
    // commands only need warnings from the ledger
    let command = args.get_command();
    if !matches!(command, cli::Commands::Start(_)) {
        init_tracing("warn", false);
    }

    // Dispatch to appropriate command handler
    match command {
        cli::Commands::Start(start_args) => {
            commands::start::execute(&args.config, &start_args.overrides()).await?;
        }
        cli::Commands::Test => {
            commands::test::execute(&args.config)?;
        }
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => commands::config::show(&args.config)?,
        },
        cli::Commands::Ledger { db_file, action } => {
            commands::ledger::execute(&args.config, db_file, action).await?;
        }
        cli::Commands::Version => {
            println!("hoststats v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

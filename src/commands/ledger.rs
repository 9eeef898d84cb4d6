use anyhow::{bail, Result};
use colored::Colorize;
use hoststats::config::{self, ConfigOverrides};
use hoststats::ledger::{LedgerPage, LedgerStore, RequestRow, ServerRow};
use std::path::Path;

use crate::cli::LedgerCommands;

/// Execute a ledger subcommand against the configured database
pub async fn execute(
    config_path: &Path,
    db_file: Option<String>,
    action: LedgerCommands,
) -> Result<()> {
    let overrides = ConfigOverrides {
        database_path: db_file,
        ..Default::default()
    };
    let cfg = config::load_config(config_path, &overrides)?;

    // Reading must not leave an empty database behind
    if !Path::new(&cfg.ledger.database_path).exists() {
        bail!("Ledger database {} does not exist", cfg.ledger.database_path);
    }

    let ledger = LedgerStore::open(&cfg.ledger).await;
    if !ledger.is_available() {
        bail!("Ledger database {} could not be opened", cfg.ledger.database_path);
    }

    match action {
        LedgerCommands::Servers { start, count } => {
            let total = ledger.total_servers().await;
            println!("{} {}", "Servers:".green().bold(), total);
            print_servers(&ledger.list_servers(start, count).await);
        }
        LedgerCommands::Requests { start, count } => {
            let total = ledger.total_requests().await;
            println!("{} {}", "Requests:".green().bold(), total);
            print_requests(&ledger.list_requests(start, count).await);
        }
        LedgerCommands::Server {
            server_id,
            page,
            count,
        } => {
            match ledger.server_socket(server_id).await {
                Some((hostname, ip)) => println!(
                    "{} {} ({} {}), last request {}",
                    "Server".green().bold(),
                    server_id,
                    hostname,
                    ip,
                    ledger.last_request_for_server(server_id).await
                ),
                None => println!("{} {}", "Unknown server".yellow(), server_id),
            }
            print_requests(&ledger.list_requests_for_server(server_id, page, count).await);
        }
    }

    ledger.close().await;
    Ok(())
}

fn print_servers(page: &LedgerPage<ServerRow>) {
    println!(
        "{}",
        format!(
            "{:>6}  {:>8}  {:<24}  {:<15}  {}",
            "ID", "REQUESTS", "HOSTNAME", "IP", "PLATFORM"
        )
        .cyan()
    );

    if page.is_no_data() {
        println!("{}", "No Data".dimmed());
        return;
    }
    for row in page.rows() {
        println!(
            "{:>6}  {:>8}  {:<24}  {:<15}  {}",
            row.server_id, row.request_count, row.hostname, row.ip, row.platform
        );
    }
}

fn print_requests(page: &LedgerPage<RequestRow>) {
    println!(
        "{}",
        format!(
            "{:>8}  {:<23}  {:<15}  {:>6}  {}",
            "ID", "TIME (UTC)", "REMOTE", "SERVER", "URL"
        )
        .cyan()
    );

    if page.is_no_data() {
        println!("{}", "No Data".dimmed());
        return;
    }
    for row in page.rows() {
        println!(
            "{:>8}  {:<23}  {:<15}  {:>6}  {}",
            row.request_id,
            format_epoch(row.epoch),
            row.remote_address,
            row.server_id,
            row.url
        );
    }
}

fn format_epoch(epoch: f64) -> String {
    chrono::DateTime::from_timestamp_micros((epoch * 1_000_000.0).round() as i64)
        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
        .unwrap_or_else(|| epoch.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_epoch() {
        assert_eq!(format_epoch(86_400.25), "1970-01-02 00:00:00.250");
    }
}

//! BiteScan CLI - Grocery receipt tracker
//!
//! Usage:
//!   bitescan init                         Initialize database
//!   bitescan receipts add-scan scan.json  Import an OCR scan
//!   bitescan prices --search chicken      Compare prices across stores
//!   bitescan pantry                       Show what is about to expire
//!   bitescan serve --port 3000            Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let user = cli.user;

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Receipts { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_receipts_list(&db, user, None),
                Some(ReceiptsAction::List { status }) => {
                    commands::cmd_receipts_list(&db, user, status.as_deref())
                }
                Some(ReceiptsAction::AddScan { file }) => {
                    commands::cmd_receipts_add_scan(&db, user, &file)
                }
                Some(ReceiptsAction::Status { receipt_id, status }) => {
                    commands::cmd_receipts_status(&db, user, receipt_id, &status)
                }
                Some(ReceiptsAction::Delete { receipt_id }) => {
                    commands::cmd_receipts_delete(&db, user, receipt_id)
                }
            }
        }
        Commands::Items { receipt } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_items(&db, user, receipt)
        }
        Commands::Prices { search } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_prices(&db, user, search.as_deref())
        }
        Commands::Pantry { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let config = commands::load_config(cli.config.as_deref())?;
            match action {
                None | Some(PantryAction::List) => {
                    commands::cmd_pantry_list(&db, &config, user, commands::today())
                }
                Some(PantryAction::Add {
                    name,
                    quantity,
                    price,
                    date,
                    store,
                    category,
                    id,
                }) => {
                    let entry = bitescan_core::PantryEntryInput {
                        id,
                        name,
                        quantity,
                        unit_price: price,
                        purchase_date: date.unwrap_or_default(),
                        store,
                        category,
                    };
                    commands::cmd_pantry_add(&db, user, &entry, commands::today())
                }
                Some(PantryAction::Delete { id }) => commands::cmd_pantry_delete(&db, user, id),
            }
        }
        Commands::Dashboard => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_dashboard(&db, user)
        }
        Commands::Sync { file } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_sync(&db, &config, user, file.as_deref()).await
        }
        Commands::Export {
            kind,
            format,
            output,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_export(&db, user, &kind, &format, output.as_deref())
        }
        Commands::Serve {
            port,
            host,
            static_dir,
        } => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_serve(
                &cli.db,
                config,
                &host,
                port,
                cli.no_encrypt,
                static_dir.as_deref(),
            )
            .await
        }
    }
}

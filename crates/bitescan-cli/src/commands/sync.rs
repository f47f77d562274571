//! Receipt sync command

use std::path::Path;

use anyhow::{Context, Result};
use bitescan_core::db::Database;
use bitescan_core::sync::{AssumeOnline, FileRemoteSource, SyncService};
use bitescan_core::Config;

/// Pull receipts from the sync server, or from a saved response file
pub async fn cmd_sync(
    db: &Database,
    config: &Config,
    user_id: i64,
    file: Option<&Path>,
) -> Result<()> {
    let service = match file {
        Some(path) => {
            println!("🔄 Syncing receipts from {}...", path.display());
            SyncService::new(Box::new(FileRemoteSource::new(path)), Box::new(AssumeOnline))
        }
        None => {
            println!("🔄 Syncing receipts from {}...", config.sync.endpoint);
            SyncService::from_config(&config.sync).context("Failed to set up sync client")?
        }
    };

    let report = service.sync_user(db, user_id).await?;

    if let Some(reason) = &report.skipped {
        println!("   ⚠️  Sync skipped ({}), showing local receipts", reason);
    } else {
        println!(
            "   Receipts: {} new, {} updated",
            report.receipts_inserted, report.receipts_updated
        );
        println!(
            "   Items:    {} new, {} updated",
            report.items_inserted, report.items_updated
        );
    }
    println!("   {} receipts stored for user {}", report.receipts.len(), user_id);
    Ok(())
}

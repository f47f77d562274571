//! Receipt CLI commands

use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use bitescan_core::db::Database;
use bitescan_core::models::{Receipt, ReceiptStatus};

use super::today;

/// Receipt of `user_id`, or an error naming the id
fn owned_receipt(db: &Database, user_id: i64, receipt_id: i64) -> Result<Receipt> {
    db.get_receipt(receipt_id)?
        .filter(|r| r.user_id == user_id)
        .ok_or_else(|| anyhow!("Receipt #{} not found", receipt_id))
}

fn status_icon(status: ReceiptStatus) -> &'static str {
    match status {
        ReceiptStatus::Pending => "⏳",
        ReceiptStatus::Processing => "⚙️ ",
        ReceiptStatus::Completed => "✓",
        ReceiptStatus::Failed => "✗",
    }
}

/// List receipts, optionally filtered by status
pub fn cmd_receipts_list(db: &Database, user_id: i64, status: Option<&str>) -> Result<()> {
    let receipts = match status {
        Some(status) => {
            let status: ReceiptStatus = status.parse().map_err(|e: String| anyhow!(e))?;
            db.get_receipts_by_status(user_id, status)?
        }
        None => db.get_receipts_for_user(user_id)?,
    };

    if receipts.is_empty() {
        println!("No receipts found");
        return Ok(());
    }

    println!("\n🧾 Receipts ({})", receipts.len());
    println!("{}", "─".repeat(60));

    for receipt in &receipts {
        let items = db.get_items_for_receipt(receipt.id)?;
        let total: f64 = items.iter().map(|i| i.line_total()).sum();
        println!(
            "  #{:<5} {} {:<20} {}  {:>3} items  ${:.2}",
            receipt.id,
            status_icon(receipt.status),
            super::truncate(&receipt.source, 20),
            receipt.date,
            items.len(),
            total
        );
    }

    println!();
    Ok(())
}

/// Import an OCR scan result from a file
pub fn cmd_receipts_add_scan(db: &Database, user_id: i64, file: &Path) -> Result<()> {
    if !file.exists() {
        bail!("File not found: {}", file.display());
    }
    let response = std::fs::read_to_string(file).context("Failed to read scan file")?;

    let result = db
        .import_scan(user_id, &response, today())
        .context("Failed to import scan")?;

    if result.duplicate {
        println!("Scan already imported as receipt #{}", result.receipt_id);
        return Ok(());
    }

    println!("✅ Imported receipt #{}", result.receipt_id);
    println!("   Items: {}", result.items_imported);
    if result.items_skipped > 0 {
        println!("   Skipped {} unnamed line(s)", result.items_skipped);
    }
    Ok(())
}

/// Set a receipt's status
pub fn cmd_receipts_status(
    db: &Database,
    user_id: i64,
    receipt_id: i64,
    status: &str,
) -> Result<()> {
    owned_receipt(db, user_id, receipt_id)?;

    let status: ReceiptStatus = status.parse().map_err(|e: String| anyhow!(e))?;
    db.update_receipt_status(receipt_id, status)?;

    println!("Receipt #{} is now {}", receipt_id, status);
    Ok(())
}

/// Delete a receipt together with its items
pub fn cmd_receipts_delete(db: &Database, user_id: i64, receipt_id: i64) -> Result<()> {
    let receipt = owned_receipt(db, user_id, receipt_id)?;
    let items = db.get_items_for_receipt(receipt_id)?.len();

    db.delete_receipt(receipt_id)?;

    println!(
        "🗑️  Deleted receipt #{} from {} ({} items)",
        receipt.id, receipt.source, items
    );
    Ok(())
}

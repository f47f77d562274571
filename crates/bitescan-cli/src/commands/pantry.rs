//! Pantry commands

use anyhow::{anyhow, Context, Result};
use bitescan_core::db::Database;
use bitescan_core::pantry::{PantryEntryInput, PantryView};
use bitescan_core::Config;
use chrono::NaiveDate;

use super::truncate;

/// List pantry items, longest-lasting first
pub fn cmd_pantry_list(
    db: &Database,
    config: &Config,
    user_id: i64,
    today: NaiveDate,
) -> Result<()> {
    let receipts = db.get_receipts_for_user(user_id)?;
    let items = db.get_items_for_user(user_id)?;
    let view = PantryView::build(user_id, &receipts, &items, &config.shelf_life, today);

    if view.items.is_empty() {
        println!("Pantry is empty");
        return Ok(());
    }

    println!("\n🥫 Pantry ({} items)", view.items.len());
    println!("{}", "─".repeat(76));

    for item in &view.items {
        let status = if item.is_expired() {
            "❌ expired".to_string()
        } else if item.days_left <= 2 {
            format!("⚠️  {} days left", item.days_left)
        } else {
            format!("{} days left", item.days_left)
        };
        println!(
            "  #{:<5} {:<24} {:<12} {:<10} exp {}  {}",
            item.id,
            truncate(&item.name, 24),
            item.quantity,
            truncate(&item.category, 10),
            item.expiration,
            status
        );
    }

    if view.expired_count > 0 {
        println!();
        println!("  {} item(s) past their expiration date", view.expired_count);
    }
    println!();
    Ok(())
}

/// Add a pantry entry, or update the one named by `entry.id`
pub fn cmd_pantry_add(
    db: &Database,
    user_id: i64,
    entry: &PantryEntryInput,
    today: NaiveDate,
) -> Result<()> {
    if let Some(id) = entry.id {
        owned_item(db, user_id, id)?;
    }
    let id = db
        .save_pantry_entry(user_id, entry, today)
        .context("Failed to save pantry entry")?;

    match entry.id {
        Some(_) => println!("✅ Updated pantry item #{}", id),
        None => println!("✅ Added pantry item #{}", id),
    }
    Ok(())
}

/// Remove an item from the pantry
pub fn cmd_pantry_delete(db: &Database, user_id: i64, id: i64) -> Result<()> {
    let name = owned_item(db, user_id, id)?;
    db.delete_item(id)?;
    println!("🗑️  Removed {} from the pantry", name);
    Ok(())
}

/// Name of an item on one of the user's receipts
fn owned_item(db: &Database, user_id: i64, id: i64) -> Result<String> {
    let item = db
        .get_item(id)?
        .ok_or_else(|| anyhow!("Item #{} not found", id))?;
    db.get_receipt(item.receipt_id)?
        .filter(|r| r.user_id == user_id)
        .ok_or_else(|| anyhow!("Item #{} not found", id))?;
    Ok(item.name)
}

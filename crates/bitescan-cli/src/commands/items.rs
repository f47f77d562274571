//! Item listing command

use anyhow::{anyhow, Result};
use bitescan_core::db::Database;

use super::truncate;

/// List purchased items, all of the user's or one receipt's
pub fn cmd_items(db: &Database, user_id: i64, receipt_id: Option<i64>) -> Result<()> {
    let items = match receipt_id {
        Some(id) => {
            db.get_receipt(id)?
                .filter(|r| r.user_id == user_id)
                .ok_or_else(|| anyhow!("Receipt #{} not found", id))?;
            db.get_items_for_receipt(id)?
        }
        None => db.get_items_for_user(user_id)?,
    };

    if items.is_empty() {
        println!("No items found");
        return Ok(());
    }

    println!(
        "\n{:<6} {:<10} {:<30} {:<10} {:>6} {:>9}",
        "ID", "Date", "Name", "Category", "Qty", "Price"
    );
    println!("{}", "─".repeat(76));

    for item in &items {
        println!(
            "{:<6} {:<10} {:<30} {:<10} {:>6} {:>9}",
            item.id,
            item.date,
            truncate(&item.name, 30),
            truncate(&item.category, 10),
            item.quantity,
            format!("${:.2}", item.price)
        );
    }

    println!();
    println!("{} items", items.len());
    Ok(())
}

//! Price comparison command

use anyhow::Result;
use bitescan_core::db::Database;
use bitescan_core::prices::PriceTrackerView;

/// Show price history per product, biggest savings first
pub fn cmd_prices(db: &Database, user_id: i64, search: Option<&str>) -> Result<()> {
    let items = db.get_items_with_receipt_store(user_id)?;
    let view = PriceTrackerView::build(&items).with_query(search.unwrap_or(""));

    if view.filtered_groups.is_empty() {
        match search {
            Some(q) => println!("No products matching '{}'", q),
            None => println!("No purchases yet"),
        }
        return Ok(());
    }

    println!("\n💲 Price Tracker ({} products)", view.filtered_groups.len());
    println!("{}", "─".repeat(60));

    for group in &view.filtered_groups {
        let name = if group.item_name.is_empty() {
            "(unnamed)"
        } else {
            group.item_name.as_str()
        };
        println!(
            "\n  {}  ${:.2} - ${:.2}  (save {}%)",
            name, group.lowest_price, group.highest_price, group.savings_percent
        );
        for entry in &group.entries {
            println!(
                "     {:<14} {:<20} ${:.2} {}",
                entry.formatted_date, entry.store, entry.price, entry.unit
            );
        }
    }

    println!();
    Ok(())
}

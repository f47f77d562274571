//! Dashboard command

use anyhow::Result;
use bitescan_core::dashboard::DashboardSnapshot;
use bitescan_core::db::Database;

pub fn cmd_dashboard(db: &Database, user_id: i64) -> Result<()> {
    let items = db.get_items_for_user(user_id)?;
    let snapshot = DashboardSnapshot::build(&items);

    println!("\n📊 BiteScan Dashboard");
    println!("{}", "─".repeat(50));

    let m = &snapshot.metrics;
    println!("  Items:     {}", m.total_items);
    println!("  Spend:     ${:.2}", m.total_spend);
    println!("  Calories:  {:.0}", m.total_calories);
    println!("  Protein:   {:.0} g", m.total_protein);

    let macros = &snapshot.macros;
    println!();
    println!(
        "  Macros:    protein {}% · carbs {}% · fats {}%",
        macros.protein_pct, macros.carbs_pct, macros.fats_pct
    );

    if !snapshot.spend_by_category.is_empty() {
        println!();
        println!("  Spend by category:");
        for spend in &snapshot.spend_by_category {
            println!(
                "    {:<12} ${:>8.2}  {:>3.0}%",
                spend.category,
                spend.amount,
                spend.fraction * 100.0
            );
        }
    }

    println!();
    for insight in &snapshot.insights {
        println!("  💡 {}: {}", insight.title, insight.message);
    }

    if !snapshot.recipes.is_empty() {
        println!();
        for recipe in &snapshot.recipes {
            println!("  🍳 {} ({})", recipe.title, recipe.details);
        }
    }

    println!();
    Ok(())
}

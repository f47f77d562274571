//! Export command

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use bitescan_core::db::Database;
use bitescan_core::export::{
    export_items_csv, export_items_json, export_prices_csv, export_prices_json, ExportFormat,
    ExportKind,
};
use bitescan_core::prices::group_by_price;

/// Export items or price history to a file or stdout
pub fn cmd_export(
    db: &Database,
    user_id: i64,
    kind: &str,
    format: &str,
    output: Option<&Path>,
) -> Result<()> {
    let kind: ExportKind = kind.parse().map_err(|e: String| anyhow!(e))?;
    let format: ExportFormat = format.parse().map_err(|e: String| anyhow!(e))?;

    let (content, count) = match kind {
        ExportKind::Items => {
            let items = db.get_items_for_user(user_id)?;
            let content = match format {
                ExportFormat::Csv => export_items_csv(&items)?,
                ExportFormat::Json => export_items_json(&items)?,
            };
            (content, items.len())
        }
        ExportKind::Prices => {
            let groups = group_by_price(&db.get_items_with_receipt_store(user_id)?);
            let content = match format {
                ExportFormat::Csv => export_prices_csv(&groups)?,
                ExportFormat::Json => export_prices_json(&groups)?,
            };
            (content, groups.len())
        }
    };

    match output {
        Some(path) => {
            std::fs::write(path, &content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("✅ Exported {} records to {}", count, path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

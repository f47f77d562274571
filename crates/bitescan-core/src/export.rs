//! Export of purchased items and price history
//!
//! Supports:
//! - Item CSV/JSON export (one row per purchased item)
//! - Price history CSV/JSON export (one row per price entry, grouped by product)

use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::PurchasedItem;
use crate::prices::PriceGroup;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown export format: {}", s)),
        }
    }
}

/// What to export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Items,
    Prices,
}

impl std::str::FromStr for ExportKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "items" => Ok(Self::Items),
            "prices" => Ok(Self::Prices),
            _ => Err(format!("Unknown export kind: {}", s)),
        }
    }
}

#[derive(Debug, Serialize)]
struct ItemRow<'a> {
    id: i64,
    date: String,
    store: &'a str,
    name: &'a str,
    category: &'a str,
    quantity: f64,
    price: f64,
    total: f64,
    calories: Option<f64>,
    protein: Option<f64>,
    carbs: Option<f64>,
    fats: Option<f64>,
    receipt_id: i64,
}

impl<'a> From<&'a PurchasedItem> for ItemRow<'a> {
    fn from(item: &'a PurchasedItem) -> Self {
        Self {
            id: item.id,
            date: item.date.format("%Y-%m-%d").to_string(),
            store: &item.store,
            name: &item.name,
            category: &item.category,
            quantity: item.quantity,
            price: item.price,
            total: item.line_total(),
            calories: item.calories,
            protein: item.protein,
            carbs: item.carbs,
            fats: item.fats,
            receipt_id: item.receipt_id,
        }
    }
}

#[derive(Debug, Serialize)]
struct PriceRow<'a> {
    product: &'a str,
    key: &'a str,
    store: &'a str,
    date: String,
    price: f64,
    quantity: f64,
    unit: &'a str,
    lowest_price: f64,
    highest_price: f64,
    savings_percent: i64,
}

fn price_rows(groups: &[PriceGroup]) -> Vec<PriceRow<'_>> {
    groups
        .iter()
        .flat_map(|group| {
            group.entries.iter().map(move |entry| PriceRow {
                product: &group.item_name,
                key: &group.key,
                store: &entry.store,
                date: entry.date.format("%Y-%m-%d").to_string(),
                price: entry.price,
                quantity: entry.quantity,
                unit: &entry.unit,
                lowest_price: group.lowest_price,
                highest_price: group.highest_price,
                savings_percent: group.savings_percent,
            })
        })
        .collect()
}

/// Serialized rows, or just the header line when there are none
fn write_csv<T: Serialize>(rows: &[T], headers: &[&str]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(!rows.is_empty())
        .from_writer(Vec::new());
    if rows.is_empty() {
        writer.write_record(headers)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| Error::InvalidData(format!("Failed to finish CSV: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| Error::InvalidData(format!("CSV is not UTF-8: {}", e)))
}

const ITEM_HEADERS: &[&str] = &[
    "id", "date", "store", "name", "category", "quantity", "price", "total", "calories", "protein", "carbs",
    "fats", "receipt_id",
];

const PRICE_HEADERS: &[&str] = &[
    "product", "key", "store", "date", "price", "quantity", "unit", "lowest_price", "highest_price",
    "savings_percent",
];

/// Purchased items as CSV (header row always present)
pub fn export_items_csv(items: &[PurchasedItem]) -> Result<String> {
    let rows: Vec<ItemRow> = items.iter().map(ItemRow::from).collect();
    write_csv(&rows, ITEM_HEADERS)
}

/// Price history as CSV, one row per entry
pub fn export_prices_csv(groups: &[PriceGroup]) -> Result<String> {
    write_csv(&price_rows(groups), PRICE_HEADERS)
}

pub fn export_items_json(items: &[PurchasedItem]) -> Result<String> {
    Ok(serde_json::to_string_pretty(items)?)
}

pub fn export_prices_json(groups: &[PriceGroup]) -> Result<String> {
    Ok(serde_json::to_string_pretty(groups)?)
}

//! Price tracker: cross-store price history per product
//!
//! Items are grouped by their normalized name so "Chkn thigh" bought at one
//! store and "2 lb Organic Chicken Breast" bought at another compare against
//! each other. Each group reports the spread between its cheapest and most
//! expensive unit price; groups with the largest spread come first.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::PurchasedItem;
use crate::normalize::{normalize, title_case};

/// One purchase of a product at a store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceEntry {
    pub store: String,
    pub price: f64,
    pub date: NaiveDate,
    /// e.g. "Mar 5, 2024"
    pub formatted_date: String,
    pub quantity: f64,
    /// "per each" or "per lbs"
    pub unit: String,
}

/// All purchases sharing a normalized name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceGroup {
    /// Most recent raw name, title-cased
    pub item_name: String,
    /// Normalized grouping key (may be empty)
    pub key: String,
    /// Newest first
    pub entries: Vec<PriceEntry>,
    pub lowest_price: f64,
    pub highest_price: f64,
    /// Spread between highest and lowest as a share of highest, 0..=100
    pub savings_percent: i64,
}

/// Display format for entry dates
pub fn format_entry_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Unit label for a price, inferred from quantity and category
pub fn determine_unit(quantity: f64, category: &str) -> &'static str {
    if quantity == 1.0 {
        return "per each";
    }
    let lower = category.to_lowercase();
    if lower.contains("meat") || lower.contains("produce") || lower.contains("seafood") {
        "per lbs"
    } else {
        "per each"
    }
}

/// `round((max - min) / max * 100)`, or 0 when max is not positive
pub fn savings_percent(lowest: f64, highest: f64) -> i64 {
    if highest > 0.0 {
        let percent = (((highest - lowest) / highest) * 100.0).round() as i64;
        percent.clamp(0, 100)
    } else {
        0
    }
}

/// Group items by normalized name, largest savings first
///
/// Items whose names normalize to "" share one group. Ties keep the order in
/// which groups were first seen.
pub fn group_by_price(items: &[PurchasedItem]) -> Vec<PriceGroup> {
    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<&PurchasedItem>> = HashMap::new();

    for item in items {
        let key = normalize(&item.name);
        buckets
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(item);
    }

    let mut groups: Vec<PriceGroup> = order
        .into_iter()
        .filter_map(|key| {
            let bucket = buckets.remove(&key)?;
            build_group(key, bucket)
        })
        .collect();

    groups.sort_by(|a, b| b.savings_percent.cmp(&a.savings_percent));
    groups
}

fn build_group(key: String, mut bucket: Vec<&PurchasedItem>) -> Option<PriceGroup> {
    bucket.sort_by(|a, b| b.date.cmp(&a.date));
    let newest = bucket.first()?;
    let item_name = title_case(&newest.name);

    let entries: Vec<PriceEntry> = bucket
        .iter()
        .map(|item| PriceEntry {
            store: item.store.clone(),
            price: item.price,
            date: item.date,
            formatted_date: format_entry_date(item.date),
            quantity: item.quantity,
            unit: determine_unit(item.quantity, &item.category).to_string(),
        })
        .collect();

    let lowest_price = entries.iter().map(|e| e.price).fold(f64::INFINITY, f64::min);
    let highest_price = entries
        .iter()
        .map(|e| e.price)
        .fold(f64::NEG_INFINITY, f64::max);

    Some(PriceGroup {
        item_name,
        key,
        entries,
        lowest_price,
        highest_price,
        savings_percent: savings_percent(lowest_price, highest_price),
    })
}

/// Groups whose display name contains `query` (case-insensitive)
///
/// A blank query keeps every group.
pub fn filter_groups(groups: &[PriceGroup], query: &str) -> Vec<PriceGroup> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return groups.to_vec();
    }
    groups
        .iter()
        .filter(|g| g.item_name.to_lowercase().contains(&query))
        .cloned()
        .collect()
}

/// Distinct non-empty normalized names, in first-seen order
pub fn valid_ingredients(items: &[PurchasedItem]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .iter()
        .map(|item| normalize(&item.name))
        .filter(|key| !key.is_empty())
        .filter(|key| seen.insert(key.clone()))
        .collect()
}

/// Snapshot of the price tracker screen
#[derive(Debug, Clone, Default, Serialize)]
pub struct PriceTrackerView {
    pub query: String,
    pub all_groups: Vec<PriceGroup>,
    pub filtered_groups: Vec<PriceGroup>,
}

impl PriceTrackerView {
    pub fn build(items: &[PurchasedItem]) -> Self {
        let all_groups = group_by_price(items);
        Self {
            query: String::new(),
            filtered_groups: all_groups.clone(),
            all_groups,
        }
    }

    /// New snapshot with the search query applied
    pub fn with_query(&self, query: &str) -> Self {
        Self {
            query: query.to_string(),
            all_groups: self.all_groups.clone(),
            filtered_groups: filter_groups(&self.all_groups, query),
        }
    }
}

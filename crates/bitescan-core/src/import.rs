//! Receipt scan import
//!
//! The OCR service answers with JSON describing the receipt, often wrapped in
//! prose or a code fence:
//!
//! ```json
//! {"merchant_name": "Costco", "transaction_date": "2024-03-01",
//!  "line_items": [{"item_name": "Bananas", "item_quantity": 6, "item_price": 0.59}]}
//! ```
//!
//! Parsing is lenient: missing quantities become 1, a missing unit price is
//! derived from the line total, nameless lines are skipped and blank
//! categories are inferred from the item name.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::categories::resolve_category;
use crate::error::{Error, Result};
use crate::models::{NewPurchasedItem, NewReceipt, ReceiptStatus, UNKNOWN_CATEGORY};

/// Receipt as extracted by the OCR service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScannedReceipt {
    #[serde(default)]
    pub merchant_name: Option<String>,
    #[serde(default)]
    pub merchant_address: Option<String>,
    #[serde(default)]
    pub transaction_date: Option<String>,
    #[serde(default)]
    pub transaction_time: Option<String>,
    #[serde(default)]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub line_items: Vec<ScannedLineItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScannedLineItem {
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub item_quantity: Option<f64>,
    #[serde(default)]
    pub item_price: Option<f64>,
    #[serde(default)]
    pub item_total: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Extract and parse the JSON object from an OCR response
pub fn parse_scan_response(response: &str) -> Result<ScannedReceipt> {
    let json_str = extract_json(response)?;
    serde_json::from_str(json_str)
        .map_err(|e| Error::Import(format!("Invalid receipt JSON from scanner: {}", e)))
}

/// Slice from the first `{` to the last `}`
fn extract_json(response: &str) -> Result<&str> {
    let response = response.trim();
    match (response.find('{'), response.rfind('}')) {
        (Some(s), Some(e)) if s < e => Ok(&response[s..=e]),
        _ => Err(Error::Import("No JSON found in scanner response".into())),
    }
}

/// SHA-256 of the JSON payload, used to spot repeated imports
pub fn content_hash(response: &str) -> Result<String> {
    let json_str = extract_json(response)?;
    let mut hasher = Sha256::new();
    hasher.update(json_str.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Receipt dates as printed: ISO, US with 4- or 2-digit year
pub fn parse_transaction_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    // Two-digit years first: %Y would read "24" as year 24
    ["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y", "%Y/%m/%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// A scan turned into records ready for insertion
///
/// Item `receipt_id`s are 0 until the receipt row exists.
#[derive(Debug, Clone)]
pub struct PreparedImport {
    pub receipt: NewReceipt,
    pub items: Vec<NewPurchasedItem>,
    /// Lines dropped for having no usable name
    pub skipped: usize,
}

impl ScannedReceipt {
    pub fn prepare(&self, user_id: i64, today: NaiveDate) -> PreparedImport {
        let date = self
            .transaction_date
            .as_deref()
            .and_then(parse_transaction_date)
            .unwrap_or(today);
        let store = self
            .merchant_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_CATEGORY)
            .to_string();

        let mut skipped = 0;
        let items = self
            .line_items
            .iter()
            .filter_map(|line| {
                let prepared = line.prepare(date, &store);
                if prepared.is_none() {
                    skipped += 1;
                }
                prepared
            })
            .collect();

        PreparedImport {
            receipt: NewReceipt {
                user_id,
                date,
                source: store,
                status: ReceiptStatus::Completed,
            },
            items,
            skipped,
        }
    }
}

impl ScannedLineItem {
    fn prepare(&self, date: NaiveDate, store: &str) -> Option<NewPurchasedItem> {
        let name = self.item_name.as_deref()?.trim();
        if name.is_empty() {
            return None;
        }

        let quantity = self.item_quantity.filter(|q| *q > 0.0).unwrap_or(1.0);
        let price = match (self.item_price, self.item_total) {
            (Some(price), _) if price >= 0.0 => price,
            (_, Some(total)) if total >= 0.0 => total / quantity,
            _ => 0.0,
        };

        Some(NewPurchasedItem {
            name: name.to_string(),
            price,
            quantity,
            date,
            store: store.to_string(),
            category: resolve_category(name, self.category.as_deref().unwrap_or("")),
            receipt_id: 0,
            calories: None,
            protein: None,
            carbs: None,
            fats: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCAN: &str = r#"Here is the receipt:
```json
{"merchant_name": "Costco", "transaction_date": "03/01/2024", "total_amount": 20.52,
 "line_items": [
   {"item_name": "Organic Bananas", "item_quantity": 6, "item_price": 0.59},
   {"item_name": "Chicken Broth", "item_total": 7.98, "item_quantity": 2},
   {"item_name": "  ", "item_price": 1.00},
   {"item_name": "Paper Towels", "category": "Household"}
 ]}
```"#;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    #[test]
    fn test_parse_wrapped_response() {
        let scan = parse_scan_response(SCAN).unwrap();
        assert_eq!(scan.merchant_name.as_deref(), Some("Costco"));
        assert_eq!(scan.line_items.len(), 4);
        assert!(parse_scan_response("no json here").is_err());
        assert!(parse_scan_response("{not json}").is_err());
    }

    #[test]
    fn test_prepare_fills_defaults() {
        let prepared = parse_scan_response(SCAN).unwrap().prepare(7, today());
        assert_eq!(prepared.receipt.user_id, 7);
        assert_eq!(prepared.receipt.source, "Costco");
        assert_eq!(prepared.receipt.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(prepared.receipt.status, ReceiptStatus::Completed);
        assert_eq!(prepared.skipped, 1);
        assert_eq!(prepared.items.len(), 3);

        let bananas = &prepared.items[0];
        assert_eq!(bananas.quantity, 6.0);
        assert_eq!(bananas.price, 0.59);
        assert_eq!(bananas.category, "Fruit");
        assert_eq!(bananas.store, "Costco");

        let broth = &prepared.items[1];
        assert_eq!(broth.price, 3.99);
        assert_eq!(broth.category, "Grocery");

        let towels = &prepared.items[2];
        assert_eq!(towels.quantity, 1.0);
        assert_eq!(towels.price, 0.0);
        assert_eq!(towels.category, "Household");
    }

    #[test]
    fn test_missing_date_and_store_default() {
        let prepared = ScannedReceipt::default().prepare(1, today());
        assert_eq!(prepared.receipt.date, today());
        assert_eq!(prepared.receipt.source, "Unknown");
        assert!(prepared.items.is_empty());
    }

    #[test]
    fn test_transaction_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1);
        assert_eq!(parse_transaction_date("2024-03-01"), expected);
        assert_eq!(parse_transaction_date("03/01/2024"), expected);
        assert_eq!(parse_transaction_date("03/01/24"), expected);
        assert_eq!(parse_transaction_date("March 1st"), None);
    }

    #[test]
    fn test_content_hash_ignores_wrapping() {
        let bare = r#"{"merchant_name": "Aldi", "line_items": []}"#;
        let wrapped = format!("Result:\n{}\nThanks!", bare);
        assert_eq!(content_hash(bare).unwrap(), content_hash(&wrapped).unwrap());
        assert_ne!(
            content_hash(bare).unwrap(),
            content_hash(r#"{"merchant_name": "Lidl", "line_items": []}"#).unwrap()
        );
        assert_eq!(content_hash(bare).unwrap().len(), 64);
    }
}

//! Domain models for BiteScan
//!
//! These are the persisted records. Derived views (price groups, pantry rows,
//! dashboard snapshots) live next to the code that computes them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Category label used when neither the scan nor the user supplied one
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Processing status of a scanned receipt
///
/// Callers set this directly. In practice a receipt moves Pending -> Completed,
/// but no transition table is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ReceiptStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ReceiptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        }
    }

    pub fn all() -> &'static [ReceiptStatus] {
        &[
            Self::Pending,
            Self::Processing,
            Self::Completed,
            Self::Failed,
        ]
    }
}

impl std::str::FromStr for ReceiptStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("Unknown receipt status: {}", s)),
        }
    }
}

impl std::fmt::Display for ReceiptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A scanned (or synced) grocery receipt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Purchase date printed on the receipt
    pub date: NaiveDate,
    /// Store the receipt came from
    pub source: String,
    pub status: ReceiptStatus,
}

/// New receipt for creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReceipt {
    pub user_id: i64,
    pub date: NaiveDate,
    pub source: String,
    #[serde(default)]
    pub status: ReceiptStatus,
}

/// A purchased line item belonging to a receipt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchasedItem {
    pub id: i64,
    /// Free-text name as printed on the receipt
    pub name: String,
    /// Unit price
    pub price: f64,
    /// Quantity bought (fractional for weighed goods)
    pub quantity: f64,
    pub date: NaiveDate,
    pub store: String,
    /// Free-text category, may be empty or "Unknown"
    pub category: String,
    pub receipt_id: i64,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fats: Option<f64>,
}

impl PurchasedItem {
    /// Price times quantity
    pub fn line_total(&self) -> f64 {
        self.price * self.quantity
    }

    /// True when the category carries no information
    pub fn has_unknown_category(&self) -> bool {
        let trimmed = self.category.trim();
        trimmed.is_empty() || trimmed.eq_ignore_ascii_case(UNKNOWN_CATEGORY)
    }
}

/// New purchased item for creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPurchasedItem {
    pub name: String,
    pub price: f64,
    pub quantity: f64,
    pub date: NaiveDate,
    pub store: String,
    pub category: String,
    pub receipt_id: i64,
    #[serde(default)]
    pub calories: Option<f64>,
    #[serde(default)]
    pub protein: Option<f64>,
    #[serde(default)]
    pub carbs: Option<f64>,
    #[serde(default)]
    pub fats: Option<f64>,
}

impl From<&PurchasedItem> for NewPurchasedItem {
    fn from(item: &PurchasedItem) -> Self {
        Self {
            name: item.name.clone(),
            price: item.price,
            quantity: item.quantity,
            date: item.date,
            store: item.store.clone(),
            category: item.category.clone(),
            receipt_id: item.receipt_id,
            calories: item.calories,
            protein: item.protein,
            carbs: item.carbs,
            fats: item.fats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_status_round_trip_names() {
        for status in ReceiptStatus::all() {
            let parsed: ReceiptStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, *status);
        }
        assert_eq!(
            "completed".parse::<ReceiptStatus>().unwrap(),
            ReceiptStatus::Completed
        );
        assert!("archived".parse::<ReceiptStatus>().is_err());
    }

    #[test]
    fn test_unknown_category_detection() {
        let mut item = PurchasedItem {
            id: 1,
            name: "Apple".into(),
            price: 1.0,
            quantity: 5.0,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            store: "Costco".into(),
            category: "Unknown".into(),
            receipt_id: 1,
            calories: None,
            protein: None,
            carbs: None,
            fats: None,
        };
        assert!(item.has_unknown_category());
        item.category = "  ".into();
        assert!(item.has_unknown_category());
        item.category = "Fruit".into();
        assert!(!item.has_unknown_category());
        assert_eq!(item.line_total(), 5.0);
    }
}

//! Virtual pantry with expiration tracking
//!
//! A pantry row is derived from a purchased item and the receipt it came from:
//! the receipt's date and store win over the item's own, the category picks a
//! shelf life, and `days_left` counts down to the resulting expiration date.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::categories::ShelfLife;
use crate::models::{PurchasedItem, Receipt};
use crate::rules::{Rule, RuleChain};

/// Date format used for pantry dates (MM/DD/YYYY)
pub const PANTRY_DATE_FORMAT: &str = "%m/%d/%Y";

/// Categories offered when adding a pantry entry by hand
pub const PANTRY_CATEGORIES: &[&str] = &["Grocery", "Fruit", "Veggies", "Meat", "Fish", "Dairy"];

static UNIT_RULES: RuleChain<&str> = RuleChain::new(&[
    Rule::any(&["banana"], "pieces"),
    Rule::any(&["yogurt"], "oz"),
    Rule::any(&["chicken"], "lbs"),
    Rule::any(&["spinach"], "oz bag"),
    Rule::any(&["bread"], "loaf"),
    Rule::any(&["milk"], "gallon"),
]);

fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    chrono::Duration::try_days(days).and_then(|d| date.checked_add_signed(d))
}

/// Expiration date and whole days remaining (negative once expired)
///
/// A shelf life that runs past the calendar falls back to the table
/// default, then to the purchase date itself.
pub fn compute_expiry_with(
    shelf_life: &ShelfLife,
    purchase_date: NaiveDate,
    category: &str,
    today: NaiveDate,
) -> (NaiveDate, i64) {
    let expiration = add_days(purchase_date, shelf_life.days_for(category))
        .or_else(|| add_days(purchase_date, shelf_life.default_days))
        .unwrap_or(purchase_date);
    let days_left = (expiration - today).num_days();
    (expiration, days_left)
}

/// [`compute_expiry_with`] using the built-in shelf life table
pub fn compute_expiry(
    purchase_date: NaiveDate,
    category: &str,
    today: NaiveDate,
) -> (NaiveDate, i64) {
    compute_expiry_with(&ShelfLife::default(), purchase_date, category, today)
}

/// Days until a formatted expiration date, 0 when it does not parse
pub fn days_left_from_str(expiration: &str, today: NaiveDate) -> i64 {
    NaiveDate::parse_from_str(expiration.trim(), PANTRY_DATE_FORMAT)
        .map(|date| (date - today).num_days())
        .unwrap_or(0)
}

pub fn format_pantry_date(date: NaiveDate) -> String {
    date.format(PANTRY_DATE_FORMAT).to_string()
}

/// Display unit guessed from the item name
pub fn pantry_unit_for_name(name: &str) -> &'static str {
    UNIT_RULES
        .first_match(&name.to_lowercase())
        .copied()
        .unwrap_or("units")
}

/// "2 lbs", "1.5 gallon"
pub fn format_quantity(quantity: f64, unit: &str) -> String {
    format!("{} {}", quantity, unit)
}

/// A row in the pantry list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PantryItem {
    pub id: i64,
    pub name: String,
    /// Quantity with its unit, e.g. "6 pieces"
    pub quantity: String,
    pub unit_price: f64,
    /// MM/DD/YYYY
    pub purchase_date: String,
    /// MM/DD/YYYY
    pub expiration: String,
    pub unit: String,
    pub store: String,
    pub category: String,
    /// Whole days until expiration; zero or less means expired
    pub days_left: i64,
}

impl PantryItem {
    pub fn is_expired(&self) -> bool {
        self.days_left <= 0
    }
}

/// Pantry rows for a user's receipts
///
/// Receipts are walked newest first and contribute the items whose
/// `receipt_id` matches; items without a listed receipt are skipped. Rows are
/// distinct by item id and sorted by `days_left`, longest-lasting first.
pub fn build_pantry(
    receipts: &[Receipt],
    items: &[PurchasedItem],
    shelf_life: &ShelfLife,
    today: NaiveDate,
) -> Vec<PantryItem> {
    let mut ordered: Vec<&Receipt> = receipts.iter().collect();
    ordered.sort_by(|a, b| b.date.cmp(&a.date));

    let mut seen = HashSet::new();
    let mut rows: Vec<PantryItem> = ordered
        .iter()
        .flat_map(|receipt| {
            items
                .iter()
                .filter(move |item| item.receipt_id == receipt.id)
                .map(move |item| pantry_row(item, receipt, shelf_life, today))
        })
        .filter(|row| seen.insert(row.id))
        .collect();

    rows.sort_by(|a, b| b.days_left.cmp(&a.days_left));
    rows
}

fn pantry_row(
    item: &PurchasedItem,
    receipt: &Receipt,
    shelf_life: &ShelfLife,
    today: NaiveDate,
) -> PantryItem {
    let purchase_date = receipt.date;
    let store = if receipt.source.is_empty() {
        item.store.clone()
    } else {
        receipt.source.clone()
    };
    let (expiration, days_left) =
        compute_expiry_with(shelf_life, purchase_date, &item.category, today);
    let unit = pantry_unit_for_name(&item.name);

    PantryItem {
        id: item.id,
        name: item.name.clone(),
        quantity: format_quantity(item.quantity, unit),
        unit_price: item.price,
        purchase_date: format_pantry_date(purchase_date),
        expiration: format_pantry_date(expiration),
        unit: unit.to_string(),
        store,
        category: item.category.clone(),
        days_left,
    }
}

/// Snapshot of a user's pantry
#[derive(Debug, Clone, Serialize)]
pub struct PantryView {
    pub user_id: i64,
    pub items: Vec<PantryItem>,
    pub expired_count: usize,
}

impl PantryView {
    pub fn build(
        user_id: i64,
        receipts: &[Receipt],
        items: &[PurchasedItem],
        shelf_life: &ShelfLife,
        today: NaiveDate,
    ) -> Self {
        let items = build_pantry(receipts, items, shelf_life, today);
        let expired_count = items.iter().filter(|i| i.is_expired()).count();
        Self {
            user_id,
            items,
            expired_count,
        }
    }
}

/// Free-text pantry entry as typed by a user
///
/// `id` is `None` for a new entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PantryEntryInput {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub unit_price: String,
    #[serde(default)]
    pub purchase_date: String,
    #[serde(default)]
    pub store: String,
    #[serde(default)]
    pub category: String,
}

impl PantryEntryInput {
    /// Digits and dots only, 0 when that still does not parse
    pub fn parsed_quantity(&self) -> f64 {
        let digits: String = self
            .quantity
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        digits.parse().unwrap_or(0.0)
    }

    pub fn parsed_price(&self) -> f64 {
        self.unit_price.trim().parse().unwrap_or(0.0)
    }

    /// MM/DD/YYYY, falling back to `today`
    pub fn parsed_purchase_date(&self, today: NaiveDate) -> NaiveDate {
        NaiveDate::parse_from_str(self.purchase_date.trim(), PANTRY_DATE_FORMAT).unwrap_or(today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReceiptStatus;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn receipt(id: i64, d: NaiveDate, source: &str) -> Receipt {
        Receipt {
            id,
            user_id: 1,
            date: d,
            source: source.to_string(),
            status: ReceiptStatus::Completed,
        }
    }

    fn item(id: i64, name: &str, category: &str, receipt_id: i64) -> PurchasedItem {
        PurchasedItem {
            id,
            name: name.to_string(),
            price: 2.5,
            quantity: 2.0,
            date: date(2020, 1, 1),
            store: "Item Store".to_string(),
            category: category.to_string(),
            receipt_id,
            calories: None,
            protein: None,
            carbs: None,
            fats: None,
        }
    }

    #[test]
    fn test_compute_expiry_by_category() {
        let today = date(2024, 3, 10);
        let (exp, left) = compute_expiry(date(2024, 3, 8), "Meat", today);
        assert_eq!(exp, date(2024, 3, 12));
        assert_eq!(left, 2);

        let (exp, left) = compute_expiry(date(2024, 3, 1), "dairy", today);
        assert_eq!(exp, date(2024, 3, 11));
        assert_eq!(left, 1);

        let (_, left) = compute_expiry(date(2024, 1, 1), "Fruit", today);
        assert_eq!(left, -62);

        let (exp, _) = compute_expiry(date(2024, 3, 1), "Snacks", today);
        assert_eq!(exp, date(2024, 3, 22));
    }

    #[test]
    fn test_shelf_life_past_calendar_uses_default() {
        let today = date(2024, 3, 10);
        let mut shelf_life = ShelfLife::default();
        shelf_life.set("Meat", 200_000_000);
        shelf_life.set("Fish", i64::MAX);

        let (exp, left) = compute_expiry_with(&shelf_life, date(2024, 3, 1), "Meat", today);
        assert_eq!(exp, date(2024, 3, 22));
        assert_eq!(left, 12);

        let (exp, _) = compute_expiry_with(&shelf_life, date(2024, 3, 1), "fish", today);
        assert_eq!(exp, date(2024, 3, 22));
    }

    #[test]
    fn test_days_left_increases_with_later_purchase() {
        let today = date(2024, 6, 15);
        for category in ["Grocery", "Fruit", "Meat", "Fish", "Dairy", "Other", ""] {
            let mut purchase = date(2024, 5, 1);
            for _ in 0..60 {
                let (_, before) = compute_expiry(purchase, category, today);
                let next = purchase.succ_opt().unwrap();
                let (_, after) = compute_expiry(next, category, today);
                assert_eq!(after, before + 1, "category {category:?} at {purchase}");
                purchase = next;
            }
        }
    }

    #[test]
    fn test_days_left_from_str() {
        let today = date(2024, 3, 10);
        assert_eq!(days_left_from_str("03/15/2024", today), 5);
        assert_eq!(days_left_from_str("03/05/2024", today), -5);
        assert_eq!(days_left_from_str("not a date", today), 0);
        assert_eq!(days_left_from_str("", today), 0);
    }

    #[test]
    fn test_pantry_units() {
        assert_eq!(pantry_unit_for_name("Bananas"), "pieces");
        assert_eq!(pantry_unit_for_name("Greek Yogurt"), "oz");
        assert_eq!(pantry_unit_for_name("Chicken Breast"), "lbs");
        assert_eq!(pantry_unit_for_name("Baby Spinach"), "oz bag");
        assert_eq!(pantry_unit_for_name("Wheat Bread"), "loaf");
        assert_eq!(pantry_unit_for_name("2% Milk"), "gallon");
        assert_eq!(pantry_unit_for_name("Rice"), "units");
        assert_eq!(format_quantity(6.0, "pieces"), "6 pieces");
        assert_eq!(format_quantity(1.5, "lbs"), "1.5 lbs");
    }

    #[test]
    fn test_build_pantry_prefers_receipt_metadata() {
        let today = date(2024, 3, 10);
        let receipts = vec![receipt(1, date(2024, 3, 8), "Costco")];
        let items = vec![item(10, "Chicken Breast", "Meat", 1)];

        let rows = build_pantry(&receipts, &items, &ShelfLife::default(), today);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.store, "Costco");
        assert_eq!(row.purchase_date, "03/08/2024");
        assert_eq!(row.expiration, "03/12/2024");
        assert_eq!(row.days_left, 2);
        assert_eq!(row.quantity, "2 lbs");
        assert_eq!(row.unit, "lbs");
    }

    #[test]
    fn test_build_pantry_sorted_and_distinct() {
        let today = date(2024, 3, 10);
        let receipts = vec![
            receipt(1, date(2024, 3, 1), "Aldi"),
            receipt(2, date(2024, 3, 9), "Target"),
        ];
        let items = vec![
            item(1, "Bananas", "Fruit", 1),
            item(2, "Rice", "Grocery", 1),
            item(3, "Milk", "Dairy", 2),
            item(3, "Milk", "Dairy", 2),
            item(4, "Orphan", "Grocery", 99),
        ];

        let view = PantryView::build(7, &receipts, &items, &ShelfLife::default(), today);
        let ids: Vec<i64> = view.items.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert_eq!(view.items[2].days_left, -2);
        assert_eq!(view.expired_count, 1);
        assert_eq!(view.user_id, 7);
    }

    #[test]
    fn test_shelf_life_overrides_apply() {
        let mut table = ShelfLife::default();
        table.set("Meat", 5);
        let (_, left) = compute_expiry_with(&table, date(2024, 3, 8), "Meat", date(2024, 3, 10));
        assert_eq!(left, 3);
    }

    #[test]
    fn test_entry_input_parsing() {
        let today = date(2024, 3, 10);
        let entry = PantryEntryInput {
            quantity: "2.5 lbs".to_string(),
            unit_price: " 3.99 ".to_string(),
            purchase_date: "02/28/2024".to_string(),
            ..Default::default()
        };
        assert_eq!(entry.parsed_quantity(), 2.5);
        assert_eq!(entry.parsed_price(), 3.99);
        assert_eq!(entry.parsed_purchase_date(today), date(2024, 2, 28));

        let junk = PantryEntryInput {
            quantity: "a few".to_string(),
            unit_price: "free".to_string(),
            purchase_date: "yesterday".to_string(),
            ..Default::default()
        };
        assert_eq!(junk.parsed_quantity(), 0.0);
        assert_eq!(junk.parsed_price(), 0.0);
        assert_eq!(junk.parsed_purchase_date(today), today);

        let dotted = PantryEntryInput {
            quantity: "1.2.3".to_string(),
            ..Default::default()
        };
        assert_eq!(dotted.parsed_quantity(), 0.0);
    }
}

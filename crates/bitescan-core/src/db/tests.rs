//! Database tests

use super::*;
use crate::models::*;
use crate::pantry::PantryEntryInput;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_receipt(db: &Database, user_id: i64, d: NaiveDate, source: &str) -> i64 {
    db.create_receipt(&NewReceipt {
        user_id,
        date: d,
        source: source.to_string(),
        status: ReceiptStatus::Pending,
    })
    .unwrap()
}

fn new_item(receipt_id: i64, name: &str, price: f64, quantity: f64) -> NewPurchasedItem {
    NewPurchasedItem {
        name: name.to_string(),
        price,
        quantity,
        date: date(2024, 3, 1),
        store: "Item Store".to_string(),
        category: "Meat".to_string(),
        receipt_id,
        calories: None,
        protein: Some(20.0),
        carbs: None,
        fats: None,
    }
}

const SCAN: &str = r#"```json
{"merchant_name": "Trader Joe's", "transaction_date": "03/02/2024",
 "line_items": [
   {"item_name": "Greek Yogurt", "item_quantity": 2, "item_price": 1.29},
   {"item_name": "Spinach 10oz", "item_total": 3.98, "item_quantity": 2},
   {"item_price": 4.0}
 ]}
```"#;

#[test]
fn test_in_memory_db() {
    let db = Database::in_memory().unwrap();
    assert!(db.get_receipts_for_user(1).unwrap().is_empty());
    assert!(db.get_items_for_user(1).unwrap().is_empty());
}

#[test]
fn test_schema_tables_exist() {
    let db = Database::in_memory().unwrap();
    let conn = db.conn().unwrap();

    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type = 'table' AND name IN ('receipts', 'items', 'scan_imports')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 3);
}

#[test]
fn test_receipt_crud() {
    let db = Database::in_memory().unwrap();
    let id = new_receipt(&db, 1, date(2024, 3, 1), "Costco");
    assert!(id > 0);

    let receipt = db.get_receipt(id).unwrap().unwrap();
    assert_eq!(receipt.source, "Costco");
    assert_eq!(receipt.status, ReceiptStatus::Pending);
    assert_eq!(receipt.date, date(2024, 3, 1));

    db.update_receipt_status(id, ReceiptStatus::Completed).unwrap();
    let receipt = db.get_receipt(id).unwrap().unwrap();
    assert_eq!(receipt.status, ReceiptStatus::Completed);

    let completed = db.get_receipts_by_status(1, ReceiptStatus::Completed).unwrap();
    assert_eq!(completed.len(), 1);
    assert!(db.get_receipts_by_status(1, ReceiptStatus::Failed).unwrap().is_empty());

    assert!(db.delete_receipt(id).unwrap());
    assert!(db.get_receipt(id).unwrap().is_none());
    assert!(!db.delete_receipt(id).unwrap());
}

#[test]
fn test_update_missing_receipt_is_not_found() {
    let db = Database::in_memory().unwrap();
    let result = db.update_receipt_status(999, ReceiptStatus::Failed);
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[test]
fn test_receipts_newest_first_and_scoped_to_user() {
    let db = Database::in_memory().unwrap();
    let older = new_receipt(&db, 1, date(2024, 1, 5), "Aldi");
    let newer = new_receipt(&db, 1, date(2024, 2, 5), "Target");
    new_receipt(&db, 2, date(2024, 3, 5), "Walmart");

    let receipts = db.get_receipts_for_user(1).unwrap();
    let ids: Vec<i64> = receipts.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![newer, older]);

    let latest = db.latest_receipt_for_user(1).unwrap().unwrap();
    assert_eq!(latest.id, newer);
    assert!(db.latest_receipt_for_user(3).unwrap().is_none());
}

#[test]
fn test_item_crud() {
    let db = Database::in_memory().unwrap();
    let receipt_id = new_receipt(&db, 1, date(2024, 3, 1), "Costco");

    let id = db.insert_item(&new_item(receipt_id, "Chicken Breast", 5.49, 2.0)).unwrap();
    let mut item = db.get_item(id).unwrap().unwrap();
    assert_eq!(item.name, "Chicken Breast");
    assert_eq!(item.protein, Some(20.0));
    assert_eq!(item.calories, None);

    item.price = 4.99;
    db.update_item(&item).unwrap();
    assert_eq!(db.get_item(id).unwrap().unwrap().price, 4.99);

    assert_eq!(db.get_items_for_receipt(receipt_id).unwrap().len(), 1);
    assert!(db.delete_item(id).unwrap());
    assert!(db.get_item(id).unwrap().is_none());
}

#[test]
fn test_negative_quantity_rejected() {
    let db = Database::in_memory().unwrap();
    let receipt_id = new_receipt(&db, 1, date(2024, 3, 1), "Costco");

    let result = db.insert_item(&new_item(receipt_id, "Milk", 3.0, -1.0));
    assert!(matches!(result, Err(Error::InvalidData(_))));
    assert!(db.get_items_for_receipt(receipt_id).unwrap().is_empty());
}

#[test]
fn test_negative_price_rejected() {
    let db = Database::in_memory().unwrap();
    let receipt_id = new_receipt(&db, 1, date(2024, 3, 1), "Costco");

    let result = db.insert_item(&new_item(receipt_id, "Milk", -3.0, 1.0));
    assert!(matches!(result, Err(Error::InvalidData(_))));

    let id = db.insert_item(&new_item(receipt_id, "Milk", 3.0, 1.0)).unwrap();
    let mut item = db.get_item(id).unwrap().unwrap();
    item.price = -0.5;
    assert!(matches!(db.update_item(&item), Err(Error::InvalidData(_))));
    assert!(matches!(db.upsert_item(&item), Err(Error::InvalidData(_))));
    item.price = f64::NAN;
    assert!(matches!(db.update_item(&item), Err(Error::InvalidData(_))));

    assert_eq!(db.get_item(id).unwrap().unwrap().price, 3.0);
}

#[test]
fn test_item_requires_existing_receipt() {
    let db = Database::in_memory().unwrap();
    let result = db.insert_item(&new_item(4242, "Milk", 3.0, 1.0));
    assert!(result.is_err());
}

#[test]
fn test_delete_receipt_cascades_to_items() {
    let db = Database::in_memory().unwrap();
    let receipt_id = new_receipt(&db, 1, date(2024, 3, 1), "Costco");
    let item_id = db.insert_item(&new_item(receipt_id, "Milk", 3.0, 1.0)).unwrap();

    db.delete_receipt(receipt_id).unwrap();
    assert!(db.get_item(item_id).unwrap().is_none());
}

#[test]
fn test_items_for_user_keep_item_store() {
    let db = Database::in_memory().unwrap();
    let receipt_id = new_receipt(&db, 1, date(2024, 3, 1), "Costco");
    db.insert_item(&new_item(receipt_id, "Milk", 3.0, 1.0)).unwrap();
    let other = new_receipt(&db, 2, date(2024, 3, 1), "Aldi");
    db.insert_item(&new_item(other, "Eggs", 3.0, 1.0)).unwrap();

    let raw = db.get_items_for_user(1).unwrap();
    assert_eq!(raw.len(), 1);
    assert_eq!(raw[0].store, "Item Store");

    let priced = db.get_items_with_receipt_store(1).unwrap();
    assert_eq!(priced.len(), 1);
    assert_eq!(priced[0].store, "Costco");
}

#[test]
fn test_upserts_insert_then_overwrite() {
    let db = Database::in_memory().unwrap();
    let mut receipt = Receipt {
        id: 700,
        user_id: 1,
        date: date(2024, 3, 1),
        source: "Costco".into(),
        status: ReceiptStatus::Pending,
    };
    db.upsert_receipt(&receipt).unwrap();

    let mut item = PurchasedItem {
        id: 9000,
        name: "Bananas".into(),
        price: 0.59,
        quantity: 6.0,
        date: date(2024, 3, 1),
        store: "Costco".into(),
        category: "Fruit".into(),
        receipt_id: 700,
        calories: None,
        protein: None,
        carbs: None,
        fats: None,
    };
    db.upsert_item(&item).unwrap();

    receipt.status = ReceiptStatus::Completed;
    db.upsert_receipt(&receipt).unwrap();
    item.price = 0.49;
    db.upsert_item(&item).unwrap();

    // Overwriting the receipt must not cascade-delete its items
    assert_eq!(db.get_receipt(700).unwrap().unwrap(), receipt);
    assert_eq!(db.get_item(9000).unwrap().unwrap(), item);
    assert_eq!(db.get_receipts_for_user(1).unwrap().len(), 1);
}

#[test]
fn test_save_pantry_entry_adds_to_latest_receipt() {
    let db = Database::in_memory().unwrap();
    new_receipt(&db, 1, date(2024, 2, 1), "Aldi");
    let latest = new_receipt(&db, 1, date(2024, 3, 1), "Costco");

    let entry = PantryEntryInput {
        id: None,
        name: " Avocado ".into(),
        quantity: "3 pieces".into(),
        unit_price: "1.25".into(),
        purchase_date: "03/04/2024".into(),
        store: "Costco".into(),
        category: "Fruit".into(),
    };
    let id = db.save_pantry_entry(1, &entry, date(2024, 3, 10)).unwrap();

    let item = db.get_item(id).unwrap().unwrap();
    assert_eq!(item.receipt_id, latest);
    assert_eq!(item.name, "Avocado");
    assert_eq!(item.quantity, 3.0);
    assert_eq!(item.price, 1.25);
    assert_eq!(item.date, date(2024, 3, 4));
}

#[test]
fn test_save_pantry_entry_update_keeps_receipt() {
    let db = Database::in_memory().unwrap();
    let first = new_receipt(&db, 1, date(2024, 2, 1), "Aldi");
    let id = db.insert_item(&new_item(first, "Chicken", 5.0, 1.0)).unwrap();
    new_receipt(&db, 1, date(2024, 3, 1), "Costco");

    let entry = PantryEntryInput {
        id: Some(id),
        name: "Chicken Thighs".into(),
        quantity: "abc".into(),
        unit_price: "not a price".into(),
        purchase_date: "yesterday".into(),
        store: "Aldi".into(),
        category: "Meat".into(),
    };
    db.save_pantry_entry(1, &entry, date(2024, 3, 10)).unwrap();

    let item = db.get_item(id).unwrap().unwrap();
    assert_eq!(item.receipt_id, first);
    assert_eq!(item.name, "Chicken Thighs");
    assert_eq!(item.quantity, 0.0);
    assert_eq!(item.price, 0.0);
    assert_eq!(item.date, date(2024, 3, 10));
    assert_eq!(item.protein, Some(20.0));
}

#[test]
fn test_save_pantry_entry_negative_price_rejected() {
    let db = Database::in_memory().unwrap();
    let receipt_id = new_receipt(&db, 1, date(2024, 3, 1), "Costco");

    let entry = PantryEntryInput {
        name: "Milk".into(),
        quantity: "1".into(),
        unit_price: "-3".into(),
        ..Default::default()
    };
    let result = db.save_pantry_entry(1, &entry, date(2024, 3, 10));
    assert!(matches!(result, Err(Error::InvalidData(_))));
    assert!(db.get_items_for_receipt(receipt_id).unwrap().is_empty());
}

#[test]
fn test_save_pantry_entry_without_receipt() {
    let db = Database::in_memory().unwrap();
    let entry = PantryEntryInput {
        name: "Milk".into(),
        ..Default::default()
    };
    let result = db.save_pantry_entry(1, &entry, date(2024, 3, 10));
    assert!(matches!(result, Err(Error::NotFound(_))));

    let blank = PantryEntryInput::default();
    let result = db.save_pantry_entry(1, &blank, date(2024, 3, 10));
    assert!(matches!(result, Err(Error::InvalidData(_))));
}

#[test]
fn test_import_scan() {
    let db = Database::in_memory().unwrap();
    let result = db.import_scan(1, SCAN, date(2024, 3, 10)).unwrap();

    assert!(!result.duplicate);
    assert_eq!(result.items_imported, 2);
    assert_eq!(result.items_skipped, 1);

    let receipt = db.get_receipt(result.receipt_id).unwrap().unwrap();
    assert_eq!(receipt.source, "Trader Joe's");
    assert_eq!(receipt.status, ReceiptStatus::Completed);
    assert_eq!(receipt.date, date(2024, 3, 2));

    let items = db.get_items_for_receipt(result.receipt_id).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].category, "Dairy");
    assert_eq!(items[1].category, "Veggies");
    assert!((items[1].price - 1.99).abs() < 1e-9);
}

#[test]
fn test_import_scan_detects_duplicates() {
    let db = Database::in_memory().unwrap();
    let first = db.import_scan(1, SCAN, date(2024, 3, 10)).unwrap();

    // Same payload with different wrapping is still a duplicate
    let rewrapped = SCAN.trim_start_matches("```json").trim_end_matches("```");
    let second = db.import_scan(1, rewrapped, date(2024, 3, 10)).unwrap();
    assert!(second.duplicate);
    assert_eq!(second.receipt_id, first.receipt_id);
    assert_eq!(db.get_receipts_for_user(1).unwrap().len(), 1);

    // Another user importing the same scan gets their own receipt
    let other = db.import_scan(2, SCAN, date(2024, 3, 10)).unwrap();
    assert!(!other.duplicate);
    assert_ne!(other.receipt_id, first.receipt_id);
}

#[test]
fn test_import_scan_rejects_garbage() {
    let db = Database::in_memory().unwrap();
    let result = db.import_scan(1, "the scanner timed out", date(2024, 3, 10));
    assert!(matches!(result, Err(Error::Import(_))));
    assert!(db.get_receipts_for_user(1).unwrap().is_empty());
}

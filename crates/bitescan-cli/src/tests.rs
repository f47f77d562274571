//! CLI command tests
//!
//! Commands print to stdout, so these tests check the database afterwards.

use std::io::Write;
use std::path::Path;

use bitescan_core::db::Database;
use bitescan_core::models::ReceiptStatus;
use bitescan_core::test_utils::MockSyncServer;
use bitescan_core::{Config, PantryEntryInput};
use chrono::NaiveDate;

use crate::commands::{self, truncate};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
}

const SCAN: &str = r#"{"merchant_name": "Trader Joe's", "transaction_date": "2024-03-02",
 "line_items": [
   {"item_name": "Greek Yogurt", "item_quantity": 2, "item_price": 1.29, "category": "Dairy"},
   {"item_name": "Spinach", "item_quantity": 1, "item_price": 2.49}
 ]}"#;

fn scan_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SCAN.as_bytes()).unwrap();
    file
}

/// Database with one imported receipt for user 1, returning its id
fn setup_with_receipt() -> (Database, i64) {
    let db = Database::in_memory().unwrap();
    let result = db.import_scan(1, SCAN, today()).unwrap();
    (db, result.receipt_id)
}

// ========== Receipts Command Tests ==========

#[test]
fn test_cmd_receipts_list_empty() {
    let db = Database::in_memory().unwrap();
    assert!(commands::cmd_receipts_list(&db, 1, None).is_ok());
}

#[test]
fn test_cmd_receipts_list_by_status() {
    let (db, _) = setup_with_receipt();
    assert!(commands::cmd_receipts_list(&db, 1, Some("Completed")).is_ok());
    assert!(commands::cmd_receipts_list(&db, 1, Some("nonsense")).is_err());
}

#[test]
fn test_cmd_receipts_add_scan() {
    let db = Database::in_memory().unwrap();
    let file = scan_file();

    commands::cmd_receipts_add_scan(&db, 1, file.path()).unwrap();
    let receipts = db.get_receipts_for_user(1).unwrap();
    assert_eq!(receipts.len(), 1);
    assert_eq!(receipts[0].source, "Trader Joe's");
    assert_eq!(db.get_items_for_receipt(receipts[0].id).unwrap().len(), 2);

    // A second import of the same scan is reported, not stored
    commands::cmd_receipts_add_scan(&db, 1, file.path()).unwrap();
    assert_eq!(db.get_receipts_for_user(1).unwrap().len(), 1);
}

#[test]
fn test_cmd_receipts_add_scan_missing_file() {
    let db = Database::in_memory().unwrap();
    let result = commands::cmd_receipts_add_scan(&db, 1, Path::new("/nonexistent/scan.json"));
    assert!(result.is_err());
}

#[test]
fn test_cmd_receipts_status() {
    let (db, id) = setup_with_receipt();

    commands::cmd_receipts_status(&db, 1, id, "failed").unwrap();
    assert_eq!(db.get_receipt(id).unwrap().unwrap().status, ReceiptStatus::Failed);

    assert!(commands::cmd_receipts_status(&db, 1, id, "archived").is_err());
    // Another user's receipt is invisible
    assert!(commands::cmd_receipts_status(&db, 2, id, "pending").is_err());
}

#[test]
fn test_cmd_receipts_delete() {
    let (db, id) = setup_with_receipt();

    assert!(commands::cmd_receipts_delete(&db, 2, id).is_err());
    commands::cmd_receipts_delete(&db, 1, id).unwrap();
    assert!(db.get_receipt(id).unwrap().is_none());
    assert!(db.get_items_for_user(1).unwrap().is_empty());
}

// ========== Views Command Tests ==========

#[test]
fn test_cmd_items() {
    let (db, id) = setup_with_receipt();
    assert!(commands::cmd_items(&db, 1, None).is_ok());
    assert!(commands::cmd_items(&db, 1, Some(id)).is_ok());
    assert!(commands::cmd_items(&db, 2, Some(id)).is_err());
}

#[test]
fn test_cmd_prices() {
    let (db, _) = setup_with_receipt();
    assert!(commands::cmd_prices(&db, 1, None).is_ok());
    assert!(commands::cmd_prices(&db, 1, Some("yogurt")).is_ok());
    assert!(commands::cmd_prices(&db, 1, Some("caviar")).is_ok());
}

#[test]
fn test_cmd_dashboard_empty() {
    let db = Database::in_memory().unwrap();
    assert!(commands::cmd_dashboard(&db, 1).is_ok());
}

#[test]
fn test_cmd_dashboard_with_data() {
    let (db, _) = setup_with_receipt();
    assert!(commands::cmd_dashboard(&db, 1).is_ok());
}

// ========== Pantry Command Tests ==========

#[test]
fn test_cmd_pantry_list() {
    let (db, _) = setup_with_receipt();
    let config = Config::embedded().unwrap();
    assert!(commands::cmd_pantry_list(&db, &config, 1, today()).is_ok());
}

#[test]
fn test_cmd_pantry_add_and_update() {
    let (db, receipt_id) = setup_with_receipt();
    let entry = PantryEntryInput {
        name: "Sourdough".into(),
        quantity: "1".into(),
        unit_price: "4.50".into(),
        category: "Bakery".into(),
        ..Default::default()
    };

    commands::cmd_pantry_add(&db, 1, &entry, today()).unwrap();
    let items = db.get_items_for_receipt(receipt_id).unwrap();
    let bread = items.iter().find(|i| i.name == "Sourdough").unwrap();
    assert_eq!(bread.price, 4.50);

    let update = PantryEntryInput {
        id: Some(bread.id),
        quantity: "2".into(),
        ..entry.clone()
    };
    commands::cmd_pantry_add(&db, 1, &update, today()).unwrap();
    assert_eq!(db.get_item(bread.id).unwrap().unwrap().quantity, 2.0);

    // Editing someone else's item fails
    assert!(commands::cmd_pantry_add(&db, 2, &update, today()).is_err());
}

#[test]
fn test_cmd_pantry_add_without_receipt() {
    let db = Database::in_memory().unwrap();
    let entry = PantryEntryInput {
        name: "Eggs".into(),
        ..Default::default()
    };
    assert!(commands::cmd_pantry_add(&db, 1, &entry, today()).is_err());
}

#[test]
fn test_cmd_pantry_delete() {
    let (db, receipt_id) = setup_with_receipt();
    let item_id = db.get_items_for_receipt(receipt_id).unwrap()[0].id;

    assert!(commands::cmd_pantry_delete(&db, 2, item_id).is_err());
    commands::cmd_pantry_delete(&db, 1, item_id).unwrap();
    assert!(db.get_item(item_id).unwrap().is_none());
    assert!(commands::cmd_pantry_delete(&db, 1, item_id).is_err());
}

// ========== Export Command Tests ==========

#[test]
fn test_cmd_export_items_csv() {
    let (db, _) = setup_with_receipt();
    let out = tempfile::NamedTempFile::new().unwrap();

    commands::cmd_export(&db, 1, "items", "csv", Some(out.path())).unwrap();
    let content = std::fs::read_to_string(out.path()).unwrap();
    assert_eq!(content.lines().count(), 3);
    assert!(content.contains("Greek Yogurt"));
}

#[test]
fn test_cmd_export_prices_json() {
    let (db, _) = setup_with_receipt();
    let out = tempfile::NamedTempFile::new().unwrap();

    commands::cmd_export(&db, 1, "prices", "json", Some(out.path())).unwrap();
    let content = std::fs::read_to_string(out.path()).unwrap();
    let groups: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(groups.as_array().unwrap().len(), 2);
}

#[test]
fn test_cmd_export_invalid_args() {
    let db = Database::in_memory().unwrap();
    assert!(commands::cmd_export(&db, 1, "receipts", "csv", None).is_err());
    assert!(commands::cmd_export(&db, 1, "items", "xml", None).is_err());
}

// ========== Sync Command Tests ==========

#[tokio::test]
async fn test_cmd_sync_from_server() {
    let server = MockSyncServer::start().await;
    let mut config = Config::embedded().unwrap();
    config.sync.endpoint = server.receipts_url();

    let db = Database::in_memory().unwrap();
    commands::cmd_sync(&db, &config, 42, None).await.unwrap();

    assert_eq!(db.get_receipts_for_user(42).unwrap().len(), 2);
    assert_eq!(db.get_items_for_user(42).unwrap().len(), 3);
}

#[tokio::test]
async fn test_cmd_sync_missing_file_is_not_an_error() {
    let (db, _) = setup_with_receipt();
    let config = Config::embedded().unwrap();

    let missing = Path::new("/nonexistent/receipts.json");
    let result = commands::cmd_sync(&db, &config, 1, Some(missing)).await;
    assert!(result.is_ok());
    assert_eq!(db.get_receipts_for_user(1).unwrap().len(), 1);
}

// ========== Helper Function Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("Organic Chicken Breast", 10), "Organic...");
    assert_eq!(truncate("exact", 5), "exact");
    assert_eq!(truncate("toolong", 6), "too...");
}

#[test]
fn test_open_db_unencrypted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");
    let db = commands::open_db(&path, true).unwrap();
    assert!(db.get_receipts_for_user(1).unwrap().is_empty());
}

//! Purchased item operations

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::{parse_date, Database, DATE_FORMAT};
use crate::error::{Error, Result};
use crate::models::*;
use crate::pantry::PantryEntryInput;

const ITEM_COLUMNS: &str = "i.id, i.name, i.price, i.quantity, i.date, i.store, i.category, \
                            i.receipt_id, i.calories, i.protein, i.carbs, i.fats";

fn validate_quantity(quantity: f64) -> Result<()> {
    if !quantity.is_finite() || quantity < 0.0 {
        return Err(Error::InvalidData(format!(
            "Quantity must be a non-negative number, got {}",
            quantity
        )));
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(Error::InvalidData(format!(
            "Price must be a non-negative number, got {}",
            price
        )));
    }
    Ok(())
}

/// Checks every item write goes through
pub(crate) fn validate_item_values(quantity: f64, price: f64) -> Result<()> {
    validate_quantity(quantity)?;
    validate_price(price)
}

/// Owner of the receipt an item belongs to, if the item exists
pub(crate) fn item_owner_on(conn: &Connection, id: i64) -> Result<Option<i64>> {
    let owner = conn
        .query_row(
            "SELECT r.user_id FROM items i JOIN receipts r ON r.id = i.receipt_id WHERE i.id = ?",
            params![id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(owner)
}

pub(crate) fn upsert_item_on(conn: &Connection, item: &PurchasedItem) -> Result<()> {
    validate_item_values(item.quantity, item.price)?;
    conn.execute(
        r#"
        INSERT INTO items (id, name, price, quantity, date, store, category, receipt_id,
                           calories, protein, carbs, fats)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            price = excluded.price,
            quantity = excluded.quantity,
            date = excluded.date,
            store = excluded.store,
            category = excluded.category,
            receipt_id = excluded.receipt_id,
            calories = excluded.calories,
            protein = excluded.protein,
            carbs = excluded.carbs,
            fats = excluded.fats
        "#,
        params![
            item.id,
            item.name,
            item.price,
            item.quantity,
            item.date.format(DATE_FORMAT).to_string(),
            item.store,
            item.category,
            item.receipt_id,
            item.calories,
            item.protein,
            item.carbs,
            item.fats,
        ],
    )?;
    Ok(())
}

impl Database {
    /// Insert a purchased item; its receipt must already exist
    pub fn insert_item(&self, item: &NewPurchasedItem) -> Result<i64> {
        validate_item_values(item.quantity, item.price)?;
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO items (name, price, quantity, date, store, category, receipt_id,
                               calories, protein, carbs, fats)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                item.name,
                item.price,
                item.quantity,
                item.date.format(DATE_FORMAT).to_string(),
                item.store,
                item.category,
                item.receipt_id,
                item.calories,
                item.protein,
                item.carbs,
                item.fats,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Get item by ID
    pub fn get_item(&self, id: i64) -> Result<Option<PurchasedItem>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare(&format!("SELECT {} FROM items i WHERE i.id = ?", ITEM_COLUMNS))?;
        let item = stmt
            .query_row(params![id], |row| Self::row_to_item(row))
            .optional()?;
        Ok(item)
    }

    /// Items of one receipt, in insertion order
    pub fn get_items_for_receipt(&self, receipt_id: i64) -> Result<Vec<PurchasedItem>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM items i WHERE i.receipt_id = ? ORDER BY i.id",
            ITEM_COLUMNS
        ))?;
        let items = stmt
            .query_map(params![receipt_id], |row| Self::row_to_item(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// Items across all of a user's receipts, as stored
    pub fn get_items_for_user(&self, user_id: i64) -> Result<Vec<PurchasedItem>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM items i JOIN receipts r ON r.id = i.receipt_id
             WHERE r.user_id = ? ORDER BY i.id",
            ITEM_COLUMNS
        ))?;
        let items = stmt
            .query_map(params![user_id], |row| Self::row_to_item(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// A user's items with the store taken from the owning receipt
    ///
    /// Used by the price tracker, where the receipt's store name is the
    /// reliable one.
    pub fn get_items_with_receipt_store(&self, user_id: i64) -> Result<Vec<PurchasedItem>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} , r.source FROM items i JOIN receipts r ON r.id = i.receipt_id
             WHERE r.user_id = ? ORDER BY i.id",
            ITEM_COLUMNS
        ))?;
        let items = stmt
            .query_map(params![user_id], |row| {
                let mut item = Self::row_to_item(row)?;
                let source: String = row.get(12)?;
                if !source.is_empty() {
                    item.store = source;
                }
                Ok(item)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<PurchasedItem> {
        let date_str: String = row.get(4)?;
        Ok(PurchasedItem {
            id: row.get(0)?,
            name: row.get(1)?,
            price: row.get(2)?,
            quantity: row.get(3)?,
            date: parse_date(&date_str),
            store: row.get(5)?,
            category: row.get(6)?,
            receipt_id: row.get(7)?,
            calories: row.get(8)?,
            protein: row.get(9)?,
            carbs: row.get(10)?,
            fats: row.get(11)?,
        })
    }

    /// Replace every field of an existing item
    pub fn update_item(&self, item: &PurchasedItem) -> Result<()> {
        validate_item_values(item.quantity, item.price)?;
        let conn = self.conn()?;
        let updated = conn.execute(
            r#"
            UPDATE items SET name = ?, price = ?, quantity = ?, date = ?, store = ?, category = ?,
                             receipt_id = ?, calories = ?, protein = ?, carbs = ?, fats = ?
            WHERE id = ?
            "#,
            params![
                item.name,
                item.price,
                item.quantity,
                item.date.format(DATE_FORMAT).to_string(),
                item.store,
                item.category,
                item.receipt_id,
                item.calories,
                item.protein,
                item.carbs,
                item.fats,
                item.id,
            ],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("Item {}", item.id)));
        }
        Ok(())
    }

    /// Insert an item with its own id, or overwrite the row with that id
    pub fn upsert_item(&self, item: &PurchasedItem) -> Result<()> {
        let conn = self.conn()?;
        upsert_item_on(&conn, item)
    }

    /// Delete an item; returns false when no item had that id
    pub fn delete_item(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM items WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }

    /// Add or update an item from a hand-typed pantry entry
    ///
    /// New entries attach to the user's most recent receipt; updates keep the
    /// item's existing receipt. Returns the item id.
    pub fn save_pantry_entry(
        &self,
        user_id: i64,
        entry: &PantryEntryInput,
        today: NaiveDate,
    ) -> Result<i64> {
        let name = entry.name.trim();
        if name.is_empty() {
            return Err(Error::InvalidData("Pantry entry needs a name".into()));
        }

        let quantity = entry.parsed_quantity();
        let price = entry.parsed_price();
        let date = entry.parsed_purchase_date(today);

        match entry.id {
            Some(id) => {
                let existing = self
                    .get_item(id)?
                    .ok_or_else(|| Error::NotFound(format!("Item {}", id)))?;
                let item = PurchasedItem {
                    id,
                    name: name.to_string(),
                    price,
                    quantity,
                    date,
                    store: entry.store.trim().to_string(),
                    category: entry.category.trim().to_string(),
                    receipt_id: existing.receipt_id,
                    calories: existing.calories,
                    protein: existing.protein,
                    carbs: existing.carbs,
                    fats: existing.fats,
                };
                self.update_item(&item)?;
                debug!("Updated pantry item {}", id);
                Ok(id)
            }
            None => {
                let receipt = self.latest_receipt_for_user(user_id)?.ok_or_else(|| {
                    Error::NotFound(format!("No receipt for user {} to add the item to", user_id))
                })?;
                let id = self.insert_item(&NewPurchasedItem {
                    name: name.to_string(),
                    price,
                    quantity,
                    date,
                    store: entry.store.trim().to_string(),
                    category: entry.category.trim().to_string(),
                    receipt_id: receipt.id,
                    calories: None,
                    protein: None,
                    carbs: None,
                    fats: None,
                })?;
                debug!("Added pantry item {} to receipt {}", id, receipt.id);
                Ok(id)
            }
        }
    }
}

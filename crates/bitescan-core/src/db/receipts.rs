//! Receipt operations

use rusqlite::{params, Connection, OptionalExtension};

use super::{parse_date, Database, DATE_FORMAT};
use crate::error::{Error, Result};
use crate::models::*;

const RECEIPT_COLUMNS: &str = "id, user_id, date, source, status";

/// Owner of a receipt id, if the row exists
pub(crate) fn receipt_owner_on(conn: &Connection, id: i64) -> Result<Option<i64>> {
    let owner = conn
        .query_row("SELECT user_id FROM receipts WHERE id = ?", params![id], |row| row.get(0))
        .optional()?;
    Ok(owner)
}

pub(crate) fn upsert_receipt_on(conn: &Connection, receipt: &Receipt) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO receipts (id, user_id, date, source, status) VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            user_id = excluded.user_id,
            date = excluded.date,
            source = excluded.source,
            status = excluded.status
        "#,
        params![
            receipt.id,
            receipt.user_id,
            receipt.date.format(DATE_FORMAT).to_string(),
            receipt.source,
            receipt.status.as_str(),
        ],
    )?;
    Ok(())
}

impl Database {
    /// Create a receipt
    pub fn create_receipt(&self, receipt: &NewReceipt) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO receipts (user_id, date, source, status) VALUES (?, ?, ?, ?)",
            params![
                receipt.user_id,
                receipt.date.format(DATE_FORMAT).to_string(),
                receipt.source,
                receipt.status.as_str(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Get receipt by ID
    pub fn get_receipt(&self, id: i64) -> Result<Option<Receipt>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM receipts WHERE id = ?",
            RECEIPT_COLUMNS
        ))?;

        let receipt = stmt
            .query_row(params![id], |row| Self::row_to_receipt(row))
            .optional()?;

        Ok(receipt)
    }

    /// All receipts of a user, newest first
    pub fn get_receipts_for_user(&self, user_id: i64) -> Result<Vec<Receipt>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM receipts WHERE user_id = ? ORDER BY date DESC, id DESC",
            RECEIPT_COLUMNS
        ))?;

        let receipts = stmt
            .query_map(params![user_id], |row| Self::row_to_receipt(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(receipts)
    }

    /// Receipts of a user with a given status, newest first
    pub fn get_receipts_by_status(
        &self,
        user_id: i64,
        status: ReceiptStatus,
    ) -> Result<Vec<Receipt>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM receipts WHERE user_id = ? AND status = ? ORDER BY date DESC, id DESC",
            RECEIPT_COLUMNS
        ))?;

        let receipts = stmt
            .query_map(params![user_id, status.as_str()], |row| {
                Self::row_to_receipt(row)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(receipts)
    }

    /// Most recent receipt of a user (by date, then id)
    pub fn latest_receipt_for_user(&self, user_id: i64) -> Result<Option<Receipt>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM receipts WHERE user_id = ? ORDER BY date DESC, id DESC LIMIT 1",
            RECEIPT_COLUMNS
        ))?;

        let receipt = stmt
            .query_row(params![user_id], |row| Self::row_to_receipt(row))
            .optional()?;

        Ok(receipt)
    }

    fn row_to_receipt(row: &rusqlite::Row) -> rusqlite::Result<Receipt> {
        let date_str: String = row.get(2)?;
        let status_str: String = row.get(4)?;

        Ok(Receipt {
            id: row.get(0)?,
            user_id: row.get(1)?,
            date: parse_date(&date_str),
            source: row.get(3)?,
            status: status_str.parse().unwrap_or_default(),
        })
    }

    /// Replace every field of an existing receipt
    pub fn update_receipt(&self, receipt: &Receipt) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE receipts SET user_id = ?, date = ?, source = ?, status = ? WHERE id = ?",
            params![
                receipt.user_id,
                receipt.date.format(DATE_FORMAT).to_string(),
                receipt.source,
                receipt.status.as_str(),
                receipt.id,
            ],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("Receipt {}", receipt.id)));
        }
        Ok(())
    }

    /// Set a receipt's status
    pub fn update_receipt_status(&self, id: i64, status: ReceiptStatus) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE receipts SET status = ? WHERE id = ?",
            params![status.as_str(), id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("Receipt {}", id)));
        }
        Ok(())
    }

    /// Insert a receipt with its own id, or overwrite the row with that id
    pub fn upsert_receipt(&self, receipt: &Receipt) -> Result<()> {
        let conn = self.conn()?;
        upsert_receipt_on(&conn, receipt)
    }

    /// Delete a receipt and, through the foreign key, its items
    ///
    /// Returns false when no receipt had that id.
    pub fn delete_receipt(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM receipts WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }
}

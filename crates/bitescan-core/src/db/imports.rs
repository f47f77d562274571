//! Scan import operations

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};
use serde::Serialize;
use tracing::info;

use super::{Database, DATE_FORMAT};
use crate::error::Result;
use crate::import::{content_hash, parse_scan_response};

/// Outcome of importing one scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportResult {
    pub receipt_id: i64,
    pub items_imported: usize,
    pub items_skipped: usize,
    /// True when the same scan was imported before; nothing was written
    pub duplicate: bool,
}

impl Database {
    /// Receipt created by an earlier import of the same scan
    pub fn find_scan_import(&self, user_id: i64, hash: &str) -> Result<Option<i64>> {
        let conn = self.conn()?;
        let receipt_id = conn
            .query_row(
                "SELECT receipt_id FROM scan_imports WHERE user_id = ? AND content_hash = ?",
                params![user_id, hash],
                |row| row.get(0),
            )
            .optional()?;
        Ok(receipt_id)
    }

    /// Import an OCR response as a Completed receipt with its items
    ///
    /// The receipt, its items and the dedupe record are written in one
    /// transaction.
    pub fn import_scan(
        &self,
        user_id: i64,
        response: &str,
        today: NaiveDate,
    ) -> Result<ImportResult> {
        let scan = parse_scan_response(response)?;
        let hash = content_hash(response)?;

        if let Some(receipt_id) = self.find_scan_import(user_id, &hash)? {
            info!("Scan already imported as receipt {}", receipt_id);
            return Ok(ImportResult {
                receipt_id,
                items_imported: 0,
                items_skipped: 0,
                duplicate: true,
            });
        }

        let prepared = scan.prepare(user_id, today);

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO receipts (user_id, date, source, status) VALUES (?, ?, ?, ?)",
            params![
                prepared.receipt.user_id,
                prepared.receipt.date.format(DATE_FORMAT).to_string(),
                prepared.receipt.source,
                prepared.receipt.status.as_str(),
            ],
        )?;
        let receipt_id = tx.last_insert_rowid();

        for item in &prepared.items {
            tx.execute(
                r#"
                INSERT INTO items (name, price, quantity, date, store, category, receipt_id)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
                params![
                    item.name,
                    item.price,
                    item.quantity,
                    item.date.format(DATE_FORMAT).to_string(),
                    item.store,
                    item.category,
                    receipt_id,
                ],
            )?;
        }

        tx.execute(
            "INSERT INTO scan_imports (user_id, content_hash, receipt_id) VALUES (?, ?, ?)",
            params![user_id, hash, receipt_id],
        )?;
        tx.commit()?;

        info!(
            "Imported scan from {} as receipt {} ({} items, {} skipped)",
            prepared.receipt.source,
            receipt_id,
            prepared.items.len(),
            prepared.skipped
        );

        Ok(ImportResult {
            receipt_id,
            items_imported: prepared.items.len(),
            items_skipped: prepared.skipped,
            duplicate: false,
        })
    }
}

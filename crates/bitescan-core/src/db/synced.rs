//! Writes of merged remote records

use tracing::debug;

use super::items::{item_owner_on, upsert_item_on};
use super::receipts::{receipt_owner_on, upsert_receipt_on};
use super::Database;
use crate::error::{Error, Result};
use crate::models::{PurchasedItem, Receipt};

impl Database {
    /// User owning a receipt id, if the receipt exists
    pub fn receipt_owner(&self, id: i64) -> Result<Option<i64>> {
        let conn = self.conn()?;
        receipt_owner_on(&conn, id)
    }

    /// User owning an item id (through its receipt), if the item exists
    pub fn item_owner(&self, id: i64) -> Result<Option<i64>> {
        let conn = self.conn()?;
        item_owner_on(&conn, id)
    }

    /// Upsert synced receipts, then their items, for one user
    ///
    /// Runs in one transaction: a record that fails validation or belongs to
    /// another user rolls back the whole batch.
    pub fn write_synced(
        &self,
        user_id: i64,
        receipts: &[Receipt],
        items: &[PurchasedItem],
    ) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        for receipt in receipts {
            let foreign = receipt.user_id != user_id
                || receipt_owner_on(&tx, receipt.id)?.is_some_and(|owner| owner != user_id);
            if foreign {
                return Err(Error::InvalidData(format!(
                    "Receipt {} belongs to another user",
                    receipt.id
                )));
            }
            upsert_receipt_on(&tx, receipt)?;
        }

        for item in items {
            let foreign = receipt_owner_on(&tx, item.receipt_id)? != Some(user_id)
                || item_owner_on(&tx, item.id)?.is_some_and(|owner| owner != user_id);
            if foreign {
                return Err(Error::InvalidData(format!(
                    "Item {} is not on a receipt of user {}",
                    item.id, user_id
                )));
            }
            upsert_item_on(&tx, item)?;
        }

        tx.commit()?;
        debug!(
            "Wrote {} synced receipts and {} items for user {}",
            receipts.len(),
            items.len(),
            user_id
        );
        Ok(())
    }
}

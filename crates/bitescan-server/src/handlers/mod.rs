//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod dashboard;
pub mod export;
pub mod items;
pub mod pantry;
pub mod prices;
pub mod receipts;
pub mod sync;

// Re-export all handlers for use in router
pub use dashboard::*;
pub use export::*;
pub use items::*;
pub use pantry::*;
pub use prices::*;
pub use receipts::*;
pub use sync::*;

use chrono::NaiveDate;

use crate::{AppError, AppState};
use bitescan_core::models::{PurchasedItem, Receipt};

/// Local calendar date used for expiry math and undated scans
pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Look up a receipt, hiding receipts of other users
pub(crate) fn owned_receipt(state: &AppState, user_id: i64, id: i64) -> Result<Receipt, AppError> {
    state
        .db
        .get_receipt(id)?
        .filter(|r| r.user_id == user_id)
        .ok_or_else(|| AppError::not_found("Receipt not found"))
}

/// Look up an item, hiding items on other users' receipts
pub(crate) fn owned_item(
    state: &AppState,
    user_id: i64,
    id: i64,
) -> Result<PurchasedItem, AppError> {
    let item = state
        .db
        .get_item(id)?
        .ok_or_else(|| AppError::not_found("Item not found"))?;
    owned_receipt(state, user_id, item.receipt_id)
        .map_err(|_| AppError::not_found("Item not found"))?;
    Ok(item)
}

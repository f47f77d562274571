//! Price tracker handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{AppError, AppState};
use bitescan_core::prices::PriceTrackerView;

/// Query parameters for the price tracker
#[derive(Debug, Deserialize)]
pub struct PriceQuery {
    pub user_id: i64,
    /// Case-insensitive product name filter
    #[serde(default)]
    pub search: String,
}

/// GET /api/prices - Price history grouped by product, largest savings first
pub async fn get_prices(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PriceQuery>,
) -> Result<Json<PriceTrackerView>, AppError> {
    let items = state.db.get_items_with_receipt_store(params.user_id)?;
    let view = PriceTrackerView::build(&items).with_query(&params.search);
    Ok(Json(view))
}

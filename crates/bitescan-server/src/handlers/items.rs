//! Item handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{AppError, AppState, UserQuery};
use bitescan_core::models::PurchasedItem;
use bitescan_core::prices::valid_ingredients;

/// GET /api/items - All items across a user's receipts
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    Query(user): Query<UserQuery>,
) -> Result<Json<Vec<PurchasedItem>>, AppError> {
    Ok(Json(state.db.get_items_for_user(user.user_id)?))
}

/// GET /api/ingredients - Distinct normalized ingredient names
pub async fn list_ingredients(
    State(state): State<Arc<AppState>>,
    Query(user): Query<UserQuery>,
) -> Result<Json<Vec<String>>, AppError> {
    let items = state.db.get_items_for_user(user.user_id)?;
    Ok(Json(valid_ingredients(&items)))
}

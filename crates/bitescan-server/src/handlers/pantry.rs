//! Pantry handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{owned_item, today};
use crate::{AppError, AppState, SuccessResponse, UserQuery};
use bitescan_core::pantry::{PantryEntryInput, PantryView};

/// GET /api/pantry - Pantry rows with days until expiration
pub async fn get_pantry(
    State(state): State<Arc<AppState>>,
    Query(user): Query<UserQuery>,
) -> Result<Json<PantryView>, AppError> {
    let receipts = state.db.get_receipts_for_user(user.user_id)?;
    let items = state.db.get_items_for_user(user.user_id)?;
    Ok(Json(PantryView::build(
        user.user_id,
        &receipts,
        &items,
        &state.config.shelf_life,
        today(),
    )))
}

/// POST /api/pantry - Add a pantry entry, or update one when `id` is set
pub async fn save_pantry_entry(
    State(state): State<Arc<AppState>>,
    Query(user): Query<UserQuery>,
    Json(entry): Json<PantryEntryInput>,
) -> Result<Json<PantryView>, AppError> {
    if let Some(id) = entry.id {
        owned_item(&state, user.user_id, id)?;
    }
    state
        .db
        .save_pantry_entry(user.user_id, &entry, today())
        .map_err(AppError::from_core)?;

    get_pantry(State(state), Query(user)).await
}

/// DELETE /api/pantry/:id - Remove an item from the pantry
pub async fn delete_pantry_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(user): Query<UserQuery>,
) -> Result<Json<SuccessResponse>, AppError> {
    owned_item(&state, user.user_id, id)?;
    let success = state.db.delete_item(id)?;
    Ok(Json(SuccessResponse { success }))
}

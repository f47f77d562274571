//! Receipt handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use super::{owned_receipt, today};
use crate::{AppError, AppState, SuccessResponse, UserQuery};
use bitescan_core::db::ImportResult;
use bitescan_core::models::{PurchasedItem, Receipt, ReceiptStatus};

/// Query parameters for listing receipts
#[derive(Debug, Deserialize)]
pub struct ReceiptListQuery {
    pub user_id: i64,
    /// Only receipts with this status
    pub status: Option<String>,
}

/// GET /api/receipts - List a user's receipts, newest first
pub async fn list_receipts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReceiptListQuery>,
) -> Result<Json<Vec<Receipt>>, AppError> {
    let receipts = match params.status.as_deref() {
        Some(status) => {
            let status: ReceiptStatus = status.parse().map_err(|_| {
                AppError::bad_request("Invalid status. Use: pending, processing, completed, failed")
            })?;
            state.db.get_receipts_by_status(params.user_id, status)?
        }
        None => state.db.get_receipts_for_user(params.user_id)?,
    };
    Ok(Json(receipts))
}

/// GET /api/receipts/:id - Get a specific receipt
pub async fn get_receipt(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(user): Query<UserQuery>,
) -> Result<Json<Receipt>, AppError> {
    Ok(Json(owned_receipt(&state, user.user_id, id)?))
}

/// GET /api/receipts/:id/items - Items of a receipt
pub async fn get_receipt_items(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(user): Query<UserQuery>,
) -> Result<Json<Vec<PurchasedItem>>, AppError> {
    owned_receipt(&state, user.user_id, id)?;
    Ok(Json(state.db.get_items_for_receipt(id)?))
}

/// Request body for a scan import
#[derive(Debug, Deserialize)]
pub struct ScanImportRequest {
    /// Raw OCR service answer; surrounding prose is ignored
    pub response: String,
}

/// POST /api/receipts/scan - Import an OCR scan as a receipt with items
pub async fn import_scan(
    State(state): State<Arc<AppState>>,
    Query(user): Query<UserQuery>,
    Json(body): Json<ScanImportRequest>,
) -> Result<Json<ImportResult>, AppError> {
    let result = state
        .db
        .import_scan(user.user_id, &body.response, today())
        .map_err(AppError::from_core)?;
    Ok(Json(result))
}

/// Request body for updating receipt status
#[derive(Debug, Deserialize)]
pub struct UpdateReceiptStatusRequest {
    /// New status (pending, processing, completed, failed)
    pub status: String,
}

/// PATCH /api/receipts/:id/status - Update receipt status
pub async fn update_receipt_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(user): Query<UserQuery>,
    Json(body): Json<UpdateReceiptStatusRequest>,
) -> Result<Json<Receipt>, AppError> {
    owned_receipt(&state, user.user_id, id)?;

    let status: ReceiptStatus = body.status.parse().map_err(|_| {
        AppError::bad_request("Invalid status. Use: pending, processing, completed, failed")
    })?;

    state
        .db
        .update_receipt_status(id, status)
        .map_err(AppError::from_core)?;
    info!("Receipt {} marked {}", id, status);

    Ok(Json(owned_receipt(&state, user.user_id, id)?))
}

/// DELETE /api/receipts/:id - Delete a receipt and its items
pub async fn delete_receipt(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(user): Query<UserQuery>,
) -> Result<Json<SuccessResponse>, AppError> {
    owned_receipt(&state, user.user_id, id)?;
    let success = state.db.delete_receipt(id)?;
    Ok(Json(SuccessResponse { success }))
}

//! Receipt sync handler

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{AppError, AppState, UserQuery};
use bitescan_core::sync::SyncReport;

/// POST /api/sync - Merge the remote receipts of a user into the local store
///
/// Network failures are reported in the body, not as an error status.
pub async fn sync_receipts(
    State(state): State<Arc<AppState>>,
    Query(user): Query<UserQuery>,
) -> Result<Json<SyncReport>, AppError> {
    let report = state.sync.sync_user(&state.db, user.user_id).await?;
    Ok(Json(report))
}

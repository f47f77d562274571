//! Dashboard handler

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{AppError, AppState, UserQuery};
use bitescan_core::dashboard::DashboardSnapshot;

/// GET /api/dashboard - Nutrition, spend, insights and recipe ideas
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Query(user): Query<UserQuery>,
) -> Result<Json<DashboardSnapshot>, AppError> {
    let items = state.db.get_items_for_user(user.user_id)?;
    Ok(Json(DashboardSnapshot::build(&items)))
}

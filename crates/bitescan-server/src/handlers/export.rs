//! Export handlers

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, Response, StatusCode},
};
use serde::Deserialize;
use tracing::info;

use crate::{AppError, AppState};
use bitescan_core::export::{
    export_items_csv, export_items_json, export_prices_csv, export_prices_json, ExportFormat,
};
use bitescan_core::prices::group_by_price;

/// Query parameters for exports
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub user_id: i64,
    /// Output format (default: csv)
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "csv".to_string()
}

fn parse_format(format: &str) -> Result<ExportFormat, AppError> {
    format
        .parse()
        .map_err(|_| AppError::bad_request("Invalid format. Use: csv, json"))
}

fn file_response(
    format: ExportFormat,
    name: &str,
    body: String,
) -> Result<Response<Body>, AppError> {
    let (content_type, extension) = match format {
        ExportFormat::Csv => ("text/csv; charset=utf-8", "csv"),
        ExportFormat::Json => ("application/json", "json"),
    };
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}.{}\"", name, extension),
        )
        .body(Body::from(body))?;
    Ok(response)
}

/// GET /api/export/items - Export purchased items
pub async fn export_items(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExportQuery>,
) -> Result<Response<Body>, AppError> {
    let format = parse_format(&params.format)?;
    let items = state.db.get_items_for_user(params.user_id)?;

    let body = match format {
        ExportFormat::Csv => export_items_csv(&items)?,
        ExportFormat::Json => export_items_json(&items)?,
    };
    info!("Exported {} items for user {}", items.len(), params.user_id);

    file_response(format, "bitescan-items", body)
}

/// GET /api/export/prices - Export price history
pub async fn export_prices(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExportQuery>,
) -> Result<Response<Body>, AppError> {
    let format = parse_format(&params.format)?;
    let items = state.db.get_items_with_receipt_store(params.user_id)?;
    let groups = group_by_price(&items);

    let body = match format {
        ExportFormat::Csv => export_prices_csv(&groups)?,
        ExportFormat::Json => export_prices_json(&groups)?,
    };
    info!("Exported {} price groups for user {}", groups.len(), params.user_id);

    file_response(format, "bitescan-prices", body)
}

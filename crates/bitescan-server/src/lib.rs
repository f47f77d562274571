//! BiteScan Web Server
//!
//! Axum-based REST API for the BiteScan grocery receipt tracker.
//!
//! Every endpoint is scoped to one user through the `user_id` query
//! parameter. Records belonging to another user answer 404.
//!
//! Security features:
//! - Restrictive CORS policy
//! - Security headers (CSP, nosniff, frame denial)
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info};

use bitescan_core::db::Database;
use bitescan_core::sync::SyncService;
use bitescan_core::Config;

mod handlers;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    /// Shelf life and sync settings
    pub config: Config,
    pub sync: SyncService,
}

/// Query parameter selecting the user every endpoint works for
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: i64,
}

/// Simple success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the router with the sync service described by `config`
pub fn create_router(
    db: Database,
    config: Config,
    static_dir: Option<&str>,
    server_config: ServerConfig,
) -> anyhow::Result<Router> {
    let sync = SyncService::from_config(&config.sync)?;
    info!(
        "Receipt sync endpoint: {} (connectivity: {})",
        config.sync.endpoint, config.sync.connectivity
    );
    Ok(create_router_with_sync(db, config, sync, static_dir, server_config))
}

/// Create the router with an explicit sync service
pub fn create_router_with_sync(
    db: Database,
    config: Config,
    sync: SyncService,
    static_dir: Option<&str>,
    server_config: ServerConfig,
) -> Router {
    let state = Arc::new(AppState { db, config, sync });

    let api_routes = Router::new()
        // Receipts
        .route("/receipts", get(handlers::list_receipts))
        .route("/receipts/scan", post(handlers::import_scan))
        .route(
            "/receipts/:id",
            get(handlers::get_receipt).delete(handlers::delete_receipt),
        )
        .route("/receipts/:id/status", patch(handlers::update_receipt_status))
        .route("/receipts/:id/items", get(handlers::get_receipt_items))
        // Items
        .route("/items", get(handlers::list_items))
        .route("/ingredients", get(handlers::list_ingredients))
        // Price tracker
        .route("/prices", get(handlers::get_prices))
        // Pantry
        .route("/pantry", get(handlers::get_pantry).post(handlers::save_pantry_entry))
        .route("/pantry/:id", delete(handlers::delete_pantry_item))
        // Dashboard
        .route("/dashboard", get(handlers::get_dashboard))
        // Sync
        .route("/sync", post(handlers::sync_receipts))
        // Export
        .route("/export/items", get(handlers::export_items))
        .route("/export/prices", get(handlers::export_prices));

    // Build CORS layer
    let methods = [
        Method::GET,
        Method::POST,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let cors = if server_config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = server_config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
    };

    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' blob: data:; connect-src 'self'; frame-ancestors 'none'",
    );

    let mut app = Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    // Serve static files if directory provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server
pub async fn serve(
    db: Database,
    config: Config,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
) -> anyhow::Result<()> {
    serve_with_config(db, config, host, port, static_dir, ServerConfig::default()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    config: Config,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    server_config: ServerConfig,
) -> anyhow::Result<()> {
    let app = create_router(db, config, static_dir, server_config)?;
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    /// Map a core error, exposing the message only for caller mistakes
    pub fn from_core(err: bitescan_core::Error) -> Self {
        use bitescan_core::Error;
        match err {
            Error::NotFound(msg) => Self::not_found(&msg),
            Error::InvalidData(msg) | Error::Import(msg) => Self::bad_request(&msg),
            other => other.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}

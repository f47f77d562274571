//! Test utilities for bitescan-core
//!
//! Provides a mock receipts API server for sync tests in this crate and in the
//! CLI and server crates (behind the `test-utils` feature).

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use chrono::NaiveDate;
use tokio::sync::oneshot;

use crate::sync::remote::{
    date_to_millis, ReceiptsRequest, ReceiptsResponse, WireEnvelope, WireItem, WireReceipt,
};

/// Mock receipts API
pub struct MockSyncServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

#[derive(Clone)]
enum Behavior {
    Respond(Arc<ReceiptsResponse>),
    Fail,
}

impl MockSyncServer {
    /// Start with the sample payload from [`sample_response`]
    pub async fn start() -> Self {
        Self::start_with(sample_response()).await
    }

    /// Start with a fixed response body
    pub async fn start_with(response: ReceiptsResponse) -> Self {
        Self::spawn(Behavior::Respond(Arc::new(response))).await
    }

    /// Start a server that answers every request with 500
    pub async fn start_failing() -> Self {
        Self::spawn(Behavior::Fail).await
    }

    async fn spawn(behavior: Behavior) -> Self {
        let app = Router::new()
            .route("/receipts", post(handle_receipts))
            .with_state(behavior);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Full URL of the receipts endpoint
    pub fn receipts_url(&self) -> String {
        format!("{}/receipts", self.url())
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockSyncServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_receipts(
    State(behavior): State<Behavior>,
    Json(_request): Json<ReceiptsRequest>,
) -> Result<Json<ReceiptsResponse>, StatusCode> {
    match behavior {
        Behavior::Respond(response) => Ok(Json((*response).clone())),
        Behavior::Fail => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

fn wire_item(
    id: i64,
    name: &str,
    price: f64,
    quantity: f64,
    date: i64,
    store: &str,
    category: &str,
) -> WireItem {
    WireItem {
        id,
        name: name.to_string(),
        price,
        quantity,
        date,
        store: store.to_string(),
        category: category.to_string(),
        calories: None,
        protein: None,
        carbs: None,
        fats: None,
    }
}

/// Two receipts with three items between them
pub fn sample_response() -> ReceiptsResponse {
    let march_1 = date_to_millis(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    let march_8 = date_to_millis(NaiveDate::from_ymd_opt(2024, 3, 8).unwrap());

    ReceiptsResponse {
        receipts: vec![
            WireEnvelope {
                receipt: WireReceipt {
                    id: 501,
                    date: march_1,
                    source: "Costco".to_string(),
                    status: Some("Completed".to_string()),
                },
                items: vec![
                    wire_item(
                        9001,
                        "Organic Chicken Breast 2lb",
                        10.98,
                        2.0,
                        march_1,
                        "Costco",
                        "Meat",
                    ),
                    wire_item(9002, "Bananas", 0.59, 6.0, march_1, "Costco", "Fruit"),
                ],
            },
            WireEnvelope {
                receipt: WireReceipt {
                    id: 502,
                    date: march_8,
                    source: "Walmart".to_string(),
                    status: Some("Pending".to_string()),
                },
                items: vec![wire_item(
                    9003,
                    "Chkn thigh boneless",
                    6.00,
                    1.0,
                    march_8,
                    "Walmart",
                    "Meat",
                )],
            },
        ],
    }
}

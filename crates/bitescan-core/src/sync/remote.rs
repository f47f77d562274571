//! Remote receipt sources and the receipts API wire format
//!
//! The receipts API answers `POST {endpoint}` with `{"user_id": N}`:
//!
//! ```json
//! {"receipts": [{"receipt": {"id": 1, "date": 1709251200000, "source": "Costco", "status": "Completed"},
//!                "items": [{"id": 10, "name": "Chicken", "price": 9.99, "quantity": 2, "date": 1709251200000}]}]}
//! ```
//!
//! Dates are epoch milliseconds. Missing text fields default to "Unknown",
//! a missing quantity to 1.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SyncConfig;
use crate::error::{Error, Result};
use crate::models::{PurchasedItem, Receipt, ReceiptStatus, UNKNOWN_CATEGORY};

/// A remote receipt with its line items, already in domain form
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteReceipt {
    pub receipt: Receipt,
    pub items: Vec<PurchasedItem>,
}

/// Anything that can list a user's receipts from outside the local store
#[async_trait]
pub trait RemoteSource: Send + Sync {
    async fn fetch_receipts(&self, user_id: i64) -> Result<Vec<RemoteReceipt>>;

    /// Short description for logs
    fn describe(&self) -> String;
}

fn unknown() -> String {
    UNKNOWN_CATEGORY.to_string()
}

fn one() -> f64 {
    1.0
}

/// Request body for the receipts API
#[derive(Debug, Serialize, Deserialize)]
pub struct ReceiptsRequest {
    pub user_id: i64,
}

/// Response body of the receipts API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReceiptsResponse {
    #[serde(default)]
    pub receipts: Vec<WireEnvelope>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireEnvelope {
    pub receipt: WireReceipt,
    #[serde(default)]
    pub items: Vec<WireItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireReceipt {
    #[serde(alias = "receipt_id")]
    pub id: i64,
    /// Epoch milliseconds
    pub date: i64,
    #[serde(default = "unknown")]
    pub source: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireItem {
    pub id: i64,
    #[serde(default = "unknown")]
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default = "one")]
    pub quantity: f64,
    /// Epoch milliseconds
    pub date: i64,
    #[serde(default = "unknown")]
    pub store: String,
    #[serde(default = "unknown")]
    pub category: String,
    #[serde(default)]
    pub calories: Option<f64>,
    #[serde(default)]
    pub protein: Option<f64>,
    #[serde(default)]
    pub carbs: Option<f64>,
    #[serde(default)]
    pub fats: Option<f64>,
}

/// Calendar date (UTC) of an epoch-milliseconds timestamp
pub fn date_from_millis(millis: i64) -> Result<NaiveDate> {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| Error::Sync(format!("Timestamp out of range: {}", millis)))
}

/// Midnight UTC of a date as epoch milliseconds
pub fn date_to_millis(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

impl WireEnvelope {
    /// Domain records for a user; unknown status strings become Pending
    pub fn into_domain(self, user_id: i64) -> Result<RemoteReceipt> {
        let receipt_id = self.receipt.id;
        let receipt = Receipt {
            id: receipt_id,
            user_id,
            date: date_from_millis(self.receipt.date)?,
            source: self.receipt.source,
            status: self
                .receipt
                .status
                .and_then(|s| s.parse::<ReceiptStatus>().ok())
                .unwrap_or_default(),
        };

        let items = self
            .items
            .into_iter()
            .map(|item| {
                Ok(PurchasedItem {
                    id: item.id,
                    name: item.name,
                    price: item.price,
                    quantity: item.quantity,
                    date: date_from_millis(item.date)?,
                    store: item.store,
                    category: item.category,
                    receipt_id,
                    calories: item.calories,
                    protein: item.protein,
                    carbs: item.carbs,
                    fats: item.fats,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RemoteReceipt { receipt, items })
    }

    /// Wire form of a stored receipt and its items
    pub fn from_domain(receipt: &Receipt, items: &[PurchasedItem]) -> Self {
        Self {
            receipt: WireReceipt {
                id: receipt.id,
                date: date_to_millis(receipt.date),
                source: receipt.source.clone(),
                status: Some(receipt.status.as_str().to_string()),
            },
            items: items
                .iter()
                .map(|item| WireItem {
                    id: item.id,
                    name: item.name.clone(),
                    price: item.price,
                    quantity: item.quantity,
                    date: date_to_millis(item.date),
                    store: item.store.clone(),
                    category: item.category.clone(),
                    calories: item.calories,
                    protein: item.protein,
                    carbs: item.carbs,
                    fats: item.fats,
                })
                .collect(),
        }
    }
}

impl ReceiptsResponse {
    pub fn into_domain(self, user_id: i64) -> Result<Vec<RemoteReceipt>> {
        self.receipts
            .into_iter()
            .map(|envelope| envelope.into_domain(user_id))
            .collect()
    }
}

/// Receipts API client
#[derive(Clone)]
pub struct HttpRemoteSource {
    http_client: Client,
    endpoint: String,
}

impl HttpRemoteSource {
    pub fn new(endpoint: &str, connect_timeout: Duration, read_timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(read_timeout)
            .build()?;
        Ok(Self {
            http_client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &SyncConfig) -> Result<Self> {
        Self::new(&config.endpoint, config.connect_timeout, config.read_timeout)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RemoteSource for HttpRemoteSource {
    async fn fetch_receipts(&self, user_id: i64) -> Result<Vec<RemoteReceipt>> {
        debug!("Fetching receipts for user {} from {}", user_id, self.endpoint);

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&ReceiptsRequest { user_id })
            .send()
            .await?
            .error_for_status()?;

        let body: ReceiptsResponse = response.json().await?;
        debug!("Receipts API returned {} receipts", body.receipts.len());
        body.into_domain(user_id)
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}

/// Receipts API response saved to disk, for offline imports
#[derive(Debug, Clone)]
pub struct FileRemoteSource {
    path: PathBuf,
}

impl FileRemoteSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RemoteSource for FileRemoteSource {
    async fn fetch_receipts(&self, user_id: i64) -> Result<Vec<RemoteReceipt>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let body: ReceiptsResponse = serde_json::from_str(&content)?;
        body.into_domain(user_id)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

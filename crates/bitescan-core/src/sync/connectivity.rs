//! Network reachability checks run before a sync

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::{ConnectivityMode, SyncConfig};

#[async_trait]
pub trait Connectivity: Send + Sync {
    async fn is_online(&self) -> bool;
}

/// Always reports online; a failed fetch is handled by the sync fallback
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeOnline;

#[async_trait]
impl Connectivity for AssumeOnline {
    async fn is_online(&self) -> bool {
        true
    }
}

/// Treats the network as up when the endpoint answers at all
///
/// Any HTTP status counts as reachable; only transport errors and timeouts
/// mean offline.
#[derive(Clone)]
pub struct HttpProbe {
    http_client: Client,
    url: String,
}

impl HttpProbe {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

    pub fn new(url: &str, timeout: Duration) -> crate::Result<Self> {
        let http_client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http_client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl Connectivity for HttpProbe {
    async fn is_online(&self) -> bool {
        match self.http_client.head(&self.url).send().await {
            Ok(_) => true,
            Err(e) => {
                debug!("Connectivity check against {} failed: {}", self.url, e);
                false
            }
        }
    }
}

/// Connectivity check selected by `sync.connectivity`
pub fn from_config(config: &SyncConfig) -> crate::Result<Box<dyn Connectivity>> {
    Ok(match config.connectivity {
        ConnectivityMode::AssumeOnline => Box::new(AssumeOnline),
        ConnectivityMode::HttpProbe => {
            Box::new(HttpProbe::new(&config.endpoint, HttpProbe::DEFAULT_TIMEOUT)?)
        }
    })
}

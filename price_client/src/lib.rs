pub mod client;
pub mod resolver;

pub use client::PriceClient;
pub use resolver::PriceResolver;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gas_core::PricePoint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PriceClientError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Price API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Rate limit exceeded")]
    RateLimit,
}

pub type Result<T> = std::result::Result<T, PriceClientError>;

/// Historical price query for one time window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceRequest {
    pub symbol: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub interval: String,
}

/// Price provider response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceResponse {
    #[serde(default)]
    pub data: Option<Vec<PricePoint>>,
}

/// A historical-price provider
#[async_trait]
pub trait PricePointSource: Send + Sync {
    /// Fetch the price points inside the request window, oldest first
    async fn fetch_price_points(&self, request: &PriceRequest) -> Result<Vec<PricePoint>>;
}

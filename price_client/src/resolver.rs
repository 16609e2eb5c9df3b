use crate::{client::PriceClient, PricePointSource, PriceRequest, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use config_manager::PriceConfig;
use gas_core::PriceFetcher;
use rust_decimal::Decimal;
use tracing::{debug, warn};

pub const DEFAULT_INTERVAL: &str = "1h";

/// Resolves the native token's fiat price at a block time.
///
/// Queries a one-hour window starting at the timestamp and takes the first
/// point. Every failure is reported as "no price".
#[derive(Debug, Clone)]
pub struct PriceResolver<S> {
    source: S,
    symbol: String,
    interval: String,
    window: Duration,
}

impl PriceResolver<PriceClient> {
    pub fn from_config(config: &PriceConfig) -> Result<Self> {
        let client = PriceClient::new(config)?;
        Ok(Self::new(client, config.symbol.clone()).with_interval(config.interval.clone()))
    }
}

impl<S: PricePointSource> PriceResolver<S> {
    pub fn new(source: S, symbol: impl Into<String>) -> Self {
        Self {
            source,
            symbol: symbol.into(),
            interval: DEFAULT_INTERVAL.to_string(),
            window: Duration::hours(1),
        }
    }

    pub fn with_interval(mut self, interval: impl Into<String>) -> Self {
        self.interval = interval.into();
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Build the query window starting at `timestamp`
    pub fn request_for(&self, timestamp: DateTime<Utc>) -> PriceRequest {
        PriceRequest {
            symbol: self.symbol.clone(),
            start: timestamp,
            end: timestamp + self.window,
            interval: self.interval.clone(),
        }
    }

    pub async fn resolve_price(&self, timestamp: DateTime<Utc>) -> Option<Decimal> {
        let request = self.request_for(timestamp);

        match self.source.fetch_price_points(&request).await {
            Ok(points) => match points.first() {
                Some(point) => {
                    debug!("{} price at {}: {}", self.symbol, timestamp, point.value);
                    Some(point.value)
                }
                None => {
                    warn!("No {} price data at {}", self.symbol, timestamp);
                    None
                }
            },
            Err(e) => {
                warn!("Failed to fetch {} price at {}: {}", self.symbol, timestamp, e);
                None
            }
        }
    }
}

#[async_trait]
impl<S: PricePointSource> PriceFetcher for PriceResolver<S> {
    async fn fetch_historical_price(&self, timestamp: DateTime<Utc>) -> Option<Decimal> {
        self.resolve_price(timestamp).await
    }
}

use crate::{PriceClientError, PricePointSource, PriceRequest, PriceResponse, Result};
use async_trait::async_trait;
use chrono::SecondsFormat;
use config_manager::PriceConfig;
use gas_core::PricePoint;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error};

/// HTTP client for the historical-price provider
#[derive(Debug, Clone)]
pub struct PriceClient {
    http_client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl PriceClient {
    pub fn new(config: &PriceConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        let api_key = Some(config.api_key.trim())
            .filter(|key| !key.is_empty())
            .map(str::to_string);

        Ok(Self {
            http_client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl PricePointSource for PriceClient {
    async fn fetch_price_points(&self, request: &PriceRequest) -> Result<Vec<PricePoint>> {
        let url = format!("{}/prices/historical", self.base_url);
        let query = [
            ("symbol", request.symbol.clone()),
            ("startTime", request.start.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ("endTime", request.end.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ("interval", request.interval.clone()),
        ];

        debug!("Fetching {} price: {:?}", request.symbol, query);

        let mut builder = self.http_client.get(&url).query(&query);
        if let Some(api_key) = &self.api_key {
            builder = builder.header("X-API-KEY", api_key);
        }

        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!("Price API error - Status: {}, Body: {}", status, text);

            return Err(match status.as_u16() {
                429 => PriceClientError::RateLimit,
                code => PriceClientError::Api {
                    status: code,
                    message: text,
                },
            });
        }

        let response_text = response.text().await?;
        let price_response: PriceResponse = serde_json::from_str(&response_text)?;

        Ok(price_response.data.unwrap_or_default())
    }
}

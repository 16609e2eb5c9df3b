use crate::{
    error::{HistoryError, Result},
    types::{HistoryPage, HistoryPageRequest},
    HistorySource,
};
use async_trait::async_trait;
use config_manager::HistoryConfig;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// HTTP client for the transaction-history provider
#[derive(Debug, Clone)]
pub struct HistoryClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HistoryClient {
    pub fn new(config: &HistoryConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        let api_key = Some(config.api_key.trim())
            .filter(|key| !key.is_empty())
            .map(str::to_string);

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn transactions_url(&self, address: &str) -> String {
        format!("{}/accounts/{}/transactions", self.base_url, address)
    }
}

#[async_trait]
impl HistorySource for HistoryClient {
    async fn fetch_page(&self, request: &HistoryPageRequest) -> Result<HistoryPage> {
        let url = self.transactions_url(&request.address);

        let mut query: Vec<(&str, String)> = vec![
            ("network", request.network.clone()),
            ("limit", request.page_size.to_string()),
        ];
        if let Some(cursor) = &request.cursor {
            query.push(("cursor", cursor.clone()));
        }

        debug!("🌐 URL: {} (cursor: {:?})", url, request.cursor);

        let mut builder = self.client.get(&url).query(&query);
        if let Some(api_key) = &self.api_key {
            builder = builder.header("X-API-KEY", api_key);
        }

        let started = Instant::now();
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!("❌ History API error - Status: {}, Body: {}", status, text);

            return Err(match status.as_u16() {
                401 | 403 => HistoryError::AuthError,
                429 => HistoryError::RateLimit,
                code => HistoryError::Api {
                    status: code,
                    message: text,
                },
            });
        }

        let response_text = response.text().await?;
        info!(
            "📨 History response: {} ({} bytes) in {}ms",
            status,
            response_text.len(),
            started.elapsed().as_millis()
        );

        match serde_json::from_str::<HistoryPage>(&response_text) {
            Ok(page) => Ok(page),
            Err(e) => {
                error!("❌ JSON parsing failed: {}", e);
                error!(
                    "🔍 Response snippet: {}",
                    response_text.chars().take(500).collect::<String>()
                );
                Err(HistoryError::Json(e))
            }
        }
    }
}

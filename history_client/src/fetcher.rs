use crate::{
    client::HistoryClient,
    error::{HistoryError, Result},
    types::{HistoryPageRequest, DEFAULT_MAX_PAGES, MAX_PAGE_SIZE},
    HistorySource,
};
use config_manager::HistoryConfig;
use gas_core::RawTransaction;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Walks the provider's cursor until the full history for an address is loaded
#[derive(Debug, Clone)]
pub struct HistoryFetcher<S> {
    source: S,
    network: String,
    page_size: u32,
    max_pages: u32,
}

impl HistoryFetcher<HistoryClient> {
    pub fn from_config(config: &HistoryConfig) -> Result<Self> {
        let client = HistoryClient::new(config)?;
        Ok(Self::new(client, config.network.clone())
            .with_page_size(config.page_size)
            .with_max_pages(config.max_pages))
    }
}

impl<S: HistorySource> HistoryFetcher<S> {
    pub fn new(source: S, network: impl Into<String>) -> Self {
        Self {
            source,
            network: network.into(),
            page_size: MAX_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Clamped to 1..=50
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        let clamped = page_size.clamp(1, MAX_PAGE_SIZE);
        if clamped != page_size {
            warn!("Page size {} out of range, using {}", page_size, clamped);
        }
        self.page_size = clamped;
        self
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch every transaction for `address`, in the order the provider returns them.
    ///
    /// Any failed page aborts the whole fetch; no partial history is returned.
    pub async fn fetch_history(
        &self,
        address: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<RawTransaction>> {
        let start_time = Instant::now();
        let mut all_transactions = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages_fetched = 0u32;

        info!(
            "🔄 Starting history fetch for {} on {} (page_size={}, max_pages={})",
            address, self.network, self.page_size, self.max_pages
        );

        loop {
            if cancel.is_cancelled() {
                info!("🛑 History fetch cancelled after {} pages", pages_fetched);
                return Err(HistoryError::Cancelled);
            }

            if pages_fetched >= self.max_pages {
                warn!(
                    "⚠️ Still paginating after {} pages, giving up on {}",
                    pages_fetched, address
                );
                return Err(HistoryError::PageLimitExceeded {
                    max_pages: self.max_pages,
                });
            }

            let page_num = pages_fetched + 1;
            let request = HistoryPageRequest {
                address: address.to_string(),
                network: self.network.clone(),
                page_size: self.page_size,
                cursor: cursor.take(),
            };

            info!("📄 Page {}: Fetching from history API...", page_num);

            let page = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("🛑 History fetch cancelled during page {}", page_num);
                    return Err(HistoryError::Cancelled);
                }
                result = self.source.fetch_page(&request) => result?,
            };
            pages_fetched = page_num;

            let (items, next_cursor) = page.into_parts();

            if items.is_empty() {
                info!("📄 Page {}: No more transactions, stopping pagination", page_num);
                break;
            }

            info!(
                "📄 Page {}: Fetched {} transactions, has_next: {}",
                page_num,
                items.len(),
                next_cursor.is_some()
            );

            all_transactions.extend(items);

            match next_cursor {
                Some(next) => {
                    debug!("🔗 Cursor available for page {}", page_num + 1);
                    cursor = Some(next);
                }
                None => break,
            }
        }

        info!(
            "📊 Pagination Summary: {} pages, {} total transactions in {}ms",
            pages_fetched,
            all_transactions.len(),
            start_time.elapsed().as_millis()
        );

        Ok(all_transactions)
    }
}

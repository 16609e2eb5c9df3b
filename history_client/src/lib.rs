pub mod client;
pub mod error;
pub mod fetcher;
pub mod types;

pub use client::HistoryClient;
pub use error::{HistoryError, Result};
pub use fetcher::HistoryFetcher;
pub use types::{HistoryPage, HistoryPageRequest, DEFAULT_MAX_PAGES, MAX_PAGE_SIZE};

use async_trait::async_trait;

/// A paginated transaction-history provider
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Fetch one page of transactions
    async fn fetch_page(&self, request: &HistoryPageRequest) -> Result<HistoryPage>;
}

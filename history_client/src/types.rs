use gas_core::RawTransaction;
use serde::{Deserialize, Serialize};

/// Most entries the provider returns per page
pub const MAX_PAGE_SIZE: u32 = 50;

/// Pages fetched before a never-ending cursor is treated as an error
pub const DEFAULT_MAX_PAGES: u32 = 10_000;

/// One page request against the history provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryPageRequest {
    pub address: String,
    pub network: String,
    pub page_size: u32,
    /// Absent on the first request
    pub cursor: Option<String>,
}

/// History provider response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryPage {
    #[serde(default)]
    pub items: Option<Vec<RawTransaction>>,

    #[serde(default)]
    pub cursor: Option<String>,
}

impl HistoryPage {
    pub fn new(items: Vec<RawTransaction>, cursor: Option<&str>) -> Self {
        Self {
            items: Some(items),
            cursor: cursor.map(str::to_string),
        }
    }

    /// Continuation cursor; an empty string counts as none
    pub fn next_cursor(&self) -> Option<&str> {
        self.cursor.as_deref().filter(|c| !c.is_empty())
    }

    pub fn into_parts(self) -> (Vec<RawTransaction>, Option<String>) {
        let cursor = self.next_cursor().map(str::to_string);
        (self.items.unwrap_or_default(), cursor)
    }
}

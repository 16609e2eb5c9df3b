use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Authentication failed")]
    AuthError,

    #[error("History fetch cancelled")]
    Cancelled,

    #[error("Provider still returned a cursor after {max_pages} pages")]
    PageLimitExceeded { max_pages: u32 },
}

pub type Result<T> = std::result::Result<T, HistoryError>;

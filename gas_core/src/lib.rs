pub mod address;
pub mod calculator;
pub mod progress;
pub mod statistics;
pub mod types;
pub mod units;

pub use address::validate_wallet_address;
pub use calculator::{CostAccumulator, CostCalculator, SkipReason, TransactionOutcome};
pub use progress::{emit_progress, ProgressSink};
pub use statistics::Statistics;
pub use types::{
    AggregateResult, BlockTimestamp, PricePoint, Quantity, RawTransaction, TransactionCost,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GasError {
    #[error("No transactions to process")]
    NoTransactions,
    #[error("Invalid wallet address: {address}")]
    InvalidAddress { address: String },
}

pub type Result<T> = std::result::Result<T, GasError>;

/// Trait for resolving the native token's fiat price at a point in time.
///
/// Implementations never fail: a provider error, an empty response or a
/// missing data point all resolve to `None`, and the calculator decides how
/// to fall back.
#[async_trait]
pub trait PriceFetcher: Send + Sync {
    /// Fetch the historical fiat price of the native token at `timestamp`
    async fn fetch_historical_price(&self, timestamp: DateTime<Utc>) -> Option<Decimal>;
}

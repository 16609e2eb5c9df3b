use config_manager::{CalculationConfig, SystemConfig, MAX_PROGRESS_INTERVAL};
use gas_core::{
    emit_progress, validate_wallet_address, AggregateResult, CostCalculator, GasError,
    PriceFetcher, ProgressSink, TransactionOutcome,
};
use history_client::{HistoryClient, HistoryError, HistoryFetcher, HistorySource};
use price_client::{PriceClient, PriceResolver};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("No transactions found for this address")]
    NoTransactions,
    #[error("Calculation cancelled")]
    Cancelled,
    #[error("History still paginating after {0} pages")]
    PageLimitExceeded(u32),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<GasError> for OrchestratorError {
    fn from(err: GasError) -> Self {
        match err {
            GasError::NoTransactions => OrchestratorError::NoTransactions,
            GasError::InvalidAddress { .. } => OrchestratorError::InvalidInput(err.to_string()),
        }
    }
}

impl From<HistoryError> for OrchestratorError {
    fn from(err: HistoryError) -> Self {
        match err {
            HistoryError::Cancelled => OrchestratorError::Cancelled,
            HistoryError::AuthError => OrchestratorError::InvalidInput(
                "History provider rejected the API key".to_string(),
            ),
            HistoryError::PageLimitExceeded { max_pages } => {
                OrchestratorError::PageLimitExceeded(max_pages)
            }
            other => OrchestratorError::Transport(other.to_string()),
        }
    }
}

impl From<config_manager::ConfigurationError> for OrchestratorError {
    fn from(err: config_manager::ConfigurationError) -> Self {
        OrchestratorError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;

/// Per-run knobs that do not change the computed figures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    /// Report progress every N processed transactions, clamped to `1..=10`
    pub progress_interval: usize,
    /// Pause every N processed transactions
    pub pacing_interval: usize,
    /// Zero disables pacing
    pub pacing_delay: Duration,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            progress_interval: 10,
            pacing_interval: 20,
            pacing_delay: Duration::from_millis(100),
        }
    }
}

impl From<&CalculationConfig> for RunSettings {
    fn from(config: &CalculationConfig) -> Self {
        Self {
            progress_interval: config.progress_interval,
            pacing_interval: config.pacing_interval,
            pacing_delay: if config.pacing_enabled() {
                Duration::from_millis(config.pacing_delay_ms)
            } else {
                Duration::ZERO
            },
        }
        .clamped()
    }
}

impl RunSettings {
    fn clamped(mut self) -> Self {
        self.progress_interval = self.progress_interval.clamp(1, MAX_PROGRESS_INTERVAL);
        self
    }

    fn report_after(&self, processed: usize, total: usize) -> bool {
        processed == total || processed % self.progress_interval.max(1) == 0
    }

    fn pause_after(&self, processed: usize, total: usize) -> bool {
        self.pacing_interval > 0
            && !self.pacing_delay.is_zero()
            && processed < total
            && processed % self.pacing_interval == 0
    }
}

/// Orchestrator wired to the HTTP history and price providers
pub type HttpGasOrchestrator = GasOrchestrator<HistoryClient, PriceResolver<PriceClient>>;

/// Computes the gas expenditure of one address: fetch history, price and
/// cost every transaction, aggregate.
pub struct GasOrchestrator<H, P> {
    history: HistoryFetcher<H>,
    prices: P,
    calculator: CostCalculator,
    settings: RunSettings,
}

impl HttpGasOrchestrator {
    pub fn from_config(config: &SystemConfig) -> Result<Self> {
        config.validate()?;

        let history = HistoryFetcher::from_config(&config.history)
            .map_err(|e| OrchestratorError::Config(format!("history client: {}", e)))?;
        let prices = PriceResolver::from_config(&config.price)
            .map_err(|e| OrchestratorError::Config(format!("price client: {}", e)))?;

        info!(
            "Gas orchestrator configured for {} on {} (page_size={}, max_pages={})",
            config.price.symbol,
            config.history.network,
            config.history.page_size,
            config.history.max_pages
        );

        Ok(Self::new(history, prices, RunSettings::from(&config.calculation))
            .with_calculator(CostCalculator::new(config.calculation.unit_exponent)))
    }
}

impl<H, P> GasOrchestrator<H, P>
where
    H: HistorySource,
    P: PriceFetcher,
{
    pub fn new(history: HistoryFetcher<H>, prices: P, settings: RunSettings) -> Self {
        Self {
            history,
            prices,
            calculator: CostCalculator::default(),
            settings: settings.clamped(),
        }
    }

    pub fn with_calculator(mut self, calculator: CostCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    pub fn history(&self) -> &HistoryFetcher<H> {
        &self.history
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Calculate the total gas spent by `address`.
    ///
    /// On failure a final progress message is emitted before the error is returned.
    pub async fn run(
        &self,
        address: &str,
        progress: Option<&dyn ProgressSink>,
        cancel: &CancellationToken,
    ) -> Result<AggregateResult> {
        let started = Instant::now();
        let result = self.execute(address, progress, cancel).await;

        match &result {
            Ok(aggregate) => info!(
                "✅ Gas calculation for {} finished in {}ms: {} transactions, {} fiat",
                address,
                started.elapsed().as_millis(),
                aggregate.statistics.transaction_count,
                aggregate.total_cost_fiat
            ),
            Err(OrchestratorError::Cancelled) => {
                info!("🛑 Gas calculation for {} cancelled", address);
                emit_progress(progress, "Calculation cancelled");
            }
            Err(e) => {
                error!("❌ Gas calculation for {} failed: {}", address, e);
                emit_progress(progress, &format!("Calculation failed: {}", e));
            }
        }

        result
    }

    async fn execute(
        &self,
        address: &str,
        progress: Option<&dyn ProgressSink>,
        cancel: &CancellationToken,
    ) -> Result<AggregateResult> {
        if address.is_empty() {
            return Err(OrchestratorError::InvalidInput(
                "Wallet address is required".to_string(),
            ));
        }
        validate_wallet_address(address)?;

        emit_progress(
            progress,
            &format!("Fetching transaction history for {}", address),
        );

        let transactions = self.history.fetch_history(address, cancel).await?;
        if transactions.is_empty() {
            return Err(OrchestratorError::NoTransactions);
        }

        let total = transactions.len();
        emit_progress(progress, &format!("Processing {} transactions", total));

        let mut accumulator = self.calculator.accumulator();

        for (index, tx) in transactions.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(OrchestratorError::Cancelled);
            }

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(OrchestratorError::Cancelled),
                outcome = accumulator.process(tx, &self.prices) => outcome,
            };

            if let TransactionOutcome::Skipped(reason) = outcome {
                debug!("Transaction {}/{} skipped: {}", index + 1, total, reason);
            }

            let processed = index + 1;
            if self.settings.report_after(processed, total) {
                emit_progress(
                    progress,
                    &format!("Processed {}/{} transactions", processed, total),
                );
            }

            if self.settings.pause_after(processed, total) {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(OrchestratorError::Cancelled),
                    _ = sleep(self.settings.pacing_delay) => {}
                }
            }
        }

        emit_progress(progress, "Finalizing results");

        let result = accumulator.finish();
        debug!(
            "Included {} of {} transactions ({} skipped)",
            result.statistics.transaction_count, total, result.statistics.skipped_count
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_errors_keep_their_kind() {
        assert_eq!(
            OrchestratorError::from(HistoryError::Cancelled),
            OrchestratorError::Cancelled
        );
        assert_eq!(
            OrchestratorError::from(HistoryError::PageLimitExceeded { max_pages: 7 }),
            OrchestratorError::PageLimitExceeded(7)
        );
        assert!(matches!(
            OrchestratorError::from(HistoryError::RateLimit),
            OrchestratorError::Transport(_)
        ));
        assert!(matches!(
            OrchestratorError::from(HistoryError::AuthError),
            OrchestratorError::InvalidInput(_)
        ));
    }

    #[test]
    fn test_invalid_address_is_invalid_input() {
        let err = OrchestratorError::from(GasError::InvalidAddress {
            address: "nope".to_string(),
        });
        assert!(matches!(err, OrchestratorError::InvalidInput(msg) if msg.contains("nope")));
    }

    #[test]
    fn test_pacing_schedule() {
        let settings = RunSettings::default();
        assert!(!settings.pause_after(19, 100));
        assert!(settings.pause_after(20, 100));
        assert!(settings.pause_after(40, 100));
        // no pause after the last transaction
        assert!(!settings.pause_after(100, 100));

        let disabled = RunSettings {
            pacing_delay: Duration::ZERO,
            ..RunSettings::default()
        };
        assert!(!disabled.pause_after(20, 100));
    }

    #[test]
    fn test_settings_from_config() {
        let config = SystemConfig::default();
        let settings = RunSettings::from(&config.calculation);
        assert_eq!(settings, RunSettings::default());
    }

    #[test]
    fn test_settings_from_config_clamp_progress_interval() {
        let mut config = SystemConfig::default();

        config.calculation.progress_interval = 0;
        assert_eq!(RunSettings::from(&config.calculation).progress_interval, 1);

        config.calculation.progress_interval = 1000;
        assert_eq!(RunSettings::from(&config.calculation).progress_interval, 10);
    }

    #[test]
    fn test_settings_from_config_without_pacing() {
        let mut config = SystemConfig::default();
        config.calculation.pacing_interval = 0;
        let settings = RunSettings::from(&config.calculation);
        assert_eq!(settings.pacing_delay, Duration::ZERO);
        assert!(!settings.pause_after(20, 100));
    }

    #[test]
    fn test_progress_schedule() {
        let settings = RunSettings::default();
        assert!(!settings.report_after(9, 25));
        assert!(settings.report_after(10, 25));
        assert!(settings.report_after(20, 25));
        assert!(settings.report_after(25, 25));

        let unchecked = RunSettings {
            progress_interval: 0,
            ..RunSettings::default()
        };
        assert!(unchecked.report_after(3, 5));
    }

    #[test]
    fn test_from_config_rejects_invalid_config() {
        let mut config = SystemConfig::default();
        config.history.page_size = 0;
        assert!(matches!(
            HttpGasOrchestrator::from_config(&config),
            Err(OrchestratorError::Config(_))
        ));
    }

    #[test]
    fn test_from_config_builds() {
        assert!(HttpGasOrchestrator::from_config(&SystemConfig::default()).is_ok());
    }
}

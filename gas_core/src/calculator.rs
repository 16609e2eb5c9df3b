use std::fmt;

use chrono::DateTime;
use num_bigint::BigUint;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::statistics::Statistics;
use crate::types::{AggregateResult, RawTransaction, TransactionCost};
use crate::units::{to_fiat, to_native_units, DEFAULT_UNIT_EXPONENT};
use crate::{GasError, PriceFetcher, Result};

/// Why a transaction was left out of the totals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingGasUsed,
    MissingGasPrice,
    MissingTimestamp,
    NoPriceAvailable,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::MissingGasUsed => "missing gas used",
            SkipReason::MissingGasPrice => "missing gas price",
            SkipReason::MissingTimestamp => "missing block timestamp",
            SkipReason::NoPriceAvailable => "no price available",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionOutcome {
    Included,
    Skipped(SkipReason),
}

/// Running totals for a single calculation run.
///
/// Transactions must be fed in fetch order: a transaction whose price cannot
/// be resolved reuses the last price resolved earlier in the same run.
#[derive(Debug)]
pub struct CostAccumulator {
    unit_exponent: u32,
    last_known_price: Option<Decimal>,
    total_cost_wei: BigUint,
    total_cost_native: Decimal,
    total_cost_fiat: Decimal,
    costs: Vec<TransactionCost>,
    processed: usize,
    skipped: usize,
}

impl CostAccumulator {
    pub fn new(unit_exponent: u32) -> Self {
        Self {
            unit_exponent,
            last_known_price: None,
            total_cost_wei: BigUint::default(),
            total_cost_native: Decimal::ZERO,
            total_cost_fiat: Decimal::ZERO,
            costs: Vec::new(),
            processed: 0,
            skipped: 0,
        }
    }

    /// Price, cost and accumulate one transaction
    pub async fn process<P>(&mut self, tx: &RawTransaction, prices: &P) -> TransactionOutcome
    where
        P: PriceFetcher + ?Sized,
    {
        self.processed += 1;

        match self.try_process(tx, prices).await {
            Ok(()) => TransactionOutcome::Included,
            Err(reason) => {
                self.skipped += 1;
                warn!("Skipping transaction {}: {}", tx.hash, reason);
                TransactionOutcome::Skipped(reason)
            }
        }
    }

    async fn try_process<P>(&mut self, tx: &RawTransaction, prices: &P) -> std::result::Result<(), SkipReason>
    where
        P: PriceFetcher + ?Sized,
    {
        let gas_used = tx.resolved_gas_used().ok_or(SkipReason::MissingGasUsed)?;
        let gas_price = tx.resolved_gas_price().ok_or(SkipReason::MissingGasPrice)?;

        let cost_wei = &gas_used * &gas_price;
        let cost_native = to_native_units(&cost_wei, self.unit_exponent);

        let timestamp = tx.timestamp_millis().ok_or(SkipReason::MissingTimestamp)?;
        let block_time = DateTime::from_timestamp_millis(timestamp).ok_or(SkipReason::MissingTimestamp)?;

        let (price, used_fallback_price) = match prices.fetch_historical_price(block_time).await {
            Some(price) => {
                self.last_known_price = Some(price);
                (price, false)
            }
            None => {
                let price = self.last_known_price.ok_or(SkipReason::NoPriceAvailable)?;
                debug!(
                    "No price for {} at {}, reusing last known price {}",
                    tx.hash, block_time, price
                );
                (price, true)
            }
        };

        let cost_fiat = to_fiat(cost_native, price);

        self.total_cost_wei += &cost_wei;
        self.total_cost_native = self.total_cost_native.saturating_add(cost_native);
        self.total_cost_fiat = self.total_cost_fiat.saturating_add(cost_fiat);

        self.costs.push(TransactionCost {
            hash: tx.hash.clone(),
            timestamp,
            cost_wei,
            cost_native,
            cost_fiat,
            gas_used,
            gas_price,
            price,
            used_fallback_price,
        });

        Ok(())
    }

    /// Sort newest first and compute statistics
    pub fn finish(mut self) -> AggregateResult {
        self.costs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let statistics = Statistics::from_costs(&self.costs, self.total_cost_fiat, self.skipped);

        info!(
            "Accumulated {} of {} transactions: {} wei, {} native, {} fiat",
            self.costs.len(),
            self.processed,
            self.total_cost_wei,
            self.total_cost_native,
            self.total_cost_fiat
        );

        AggregateResult {
            total_cost_wei: self.total_cost_wei,
            total_cost_native: self.total_cost_native,
            total_cost_fiat: self.total_cost_fiat,
            transactions: self.costs,
            statistics,
        }
    }
}

/// Gas cost calculation engine
#[derive(Debug, Clone, Copy)]
pub struct CostCalculator {
    unit_exponent: u32,
}

impl Default for CostCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_UNIT_EXPONENT)
    }
}

impl CostCalculator {
    pub fn new(unit_exponent: u32) -> Self {
        Self { unit_exponent }
    }

    /// Start a fresh run
    pub fn accumulator(&self) -> CostAccumulator {
        CostAccumulator::new(self.unit_exponent)
    }

    /// Cost every transaction in fetch order and aggregate the results
    pub async fn accumulate<P>(&self, transactions: &[RawTransaction], prices: &P) -> Result<AggregateResult>
    where
        P: PriceFetcher + ?Sized,
    {
        if transactions.is_empty() {
            return Err(GasError::NoTransactions);
        }

        debug!("Calculating gas costs for {} transactions", transactions.len());

        let mut accumulator = self.accumulator();
        for tx in transactions {
            accumulator.process(tx, prices).await;
        }

        Ok(accumulator.finish())
    }
}

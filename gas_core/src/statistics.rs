use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::TransactionCost;

const MILLIS_PER_DAY: u64 = 24 * 60 * 60 * 1000;

/// Summary figures over the included transactions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// Number of transactions included in the totals
    pub transaction_count: usize,

    /// Input transactions dropped for missing gas data, timestamp or price
    pub skipped_count: usize,

    /// Highest single fiat cost
    pub most_expensive_fiat: Decimal,

    /// Mean fiat cost per included transaction
    pub average_fiat: Decimal,

    /// Whole days between the oldest and newest transaction, rounded up
    pub time_range_days: u64,

    /// Oldest block timestamp in milliseconds
    pub oldest_timestamp: i64,

    /// Newest block timestamp in milliseconds
    pub newest_timestamp: i64,
}

impl Statistics {
    /// Compute statistics; every figure is zero when `costs` is empty.
    pub fn from_costs(costs: &[TransactionCost], total_fiat: Decimal, skipped_count: usize) -> Self {
        if costs.is_empty() {
            return Self {
                skipped_count,
                ..Self::default()
            };
        }

        let most_expensive_fiat = costs
            .iter()
            .map(|c| c.cost_fiat)
            .max()
            .unwrap_or(Decimal::ZERO);

        let average_fiat = total_fiat
            .checked_div(Decimal::from(costs.len()))
            .unwrap_or(Decimal::ZERO);

        let oldest_timestamp = costs.iter().map(|c| c.timestamp).min().unwrap_or(0);
        let newest_timestamp = costs.iter().map(|c| c.timestamp).max().unwrap_or(0);

        Self {
            transaction_count: costs.len(),
            skipped_count,
            most_expensive_fiat,
            average_fiat,
            time_range_days: days_between(oldest_timestamp, newest_timestamp),
            oldest_timestamp,
            newest_timestamp,
        }
    }
}

fn days_between(oldest_millis: i64, newest_millis: i64) -> u64 {
    newest_millis.abs_diff(oldest_millis).div_ceil(MILLIS_PER_DAY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;
    use rust_decimal_macros::dec;

    fn cost(timestamp: i64, fiat: Decimal) -> TransactionCost {
        TransactionCost {
            hash: format!("0x{timestamp}"),
            timestamp,
            cost_wei: BigUint::from(1u32),
            cost_native: Decimal::ZERO,
            cost_fiat: fiat,
            gas_used: BigUint::from(1u32),
            gas_price: BigUint::from(1u32),
            price: Decimal::ONE,
            used_fallback_price: false,
        }
    }

    #[test]
    fn test_empty_costs_report_zeroes() {
        let stats = Statistics::from_costs(&[], Decimal::ZERO, 3);
        assert_eq!(stats.transaction_count, 0);
        assert_eq!(stats.skipped_count, 3);
        assert_eq!(stats.most_expensive_fiat, Decimal::ZERO);
        assert_eq!(stats.average_fiat, Decimal::ZERO);
        assert_eq!(stats.time_range_days, 0);
        assert_eq!(stats.oldest_timestamp, 0);
        assert_eq!(stats.newest_timestamp, 0);
    }

    #[test]
    fn test_max_average_and_range() {
        let day = MILLIS_PER_DAY as i64;
        let costs = vec![
            cost(10 * day, dec!(3)),
            cost(10 * day + 1, dec!(9)),
            cost(8 * day, dec!(6)),
        ];
        let stats = Statistics::from_costs(&costs, dec!(18), 0);

        assert_eq!(stats.transaction_count, 3);
        assert_eq!(stats.most_expensive_fiat, dec!(9));
        assert_eq!(stats.average_fiat, dec!(6));
        assert_eq!(stats.oldest_timestamp, 8 * day);
        assert_eq!(stats.newest_timestamp, 10 * day + 1);
        // two days and one millisecond rounds up to three
        assert_eq!(stats.time_range_days, 3);
    }

    #[test]
    fn test_single_transaction_has_zero_range() {
        let stats = Statistics::from_costs(&[cost(5_000, dec!(1.5))], dec!(1.5), 0);
        assert_eq!(stats.time_range_days, 0);
        assert_eq!(stats.average_fiat, dec!(1.5));
    }

    #[test]
    fn test_exact_day_boundary() {
        assert_eq!(days_between(0, MILLIS_PER_DAY as i64), 1);
        assert_eq!(days_between(0, 1), 1);
    }
}

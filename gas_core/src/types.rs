use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::statistics::Statistics;

/// One entry returned by the transaction-history provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    /// Transaction hash
    #[serde(default, alias = "transactionHash")]
    pub hash: String,

    /// Gas consumed by the transaction (primary field)
    #[serde(default)]
    pub gas_used: Option<Quantity>,

    /// Legacy name for the gas amount
    #[serde(default)]
    pub gas: Option<Quantity>,

    /// Price paid per unit of gas, in the smallest native unit (primary field)
    #[serde(default)]
    pub gas_price: Option<Quantity>,

    /// Legacy name for the gas price
    #[serde(default)]
    pub effective_gas_price: Option<Quantity>,

    /// Block timestamp in milliseconds since the epoch
    #[serde(default, alias = "blockTimestamp")]
    pub timestamp: Option<BlockTimestamp>,
}

impl RawTransaction {
    /// Gas used, preferring `gasUsed` over the legacy `gas` field
    pub fn resolved_gas_used(&self) -> Option<BigUint> {
        self.gas_used
            .as_ref()
            .and_then(Quantity::to_biguint)
            .or_else(|| self.gas.as_ref().and_then(Quantity::to_biguint))
    }

    /// Gas price, preferring `gasPrice` over the legacy `effectiveGasPrice` field
    pub fn resolved_gas_price(&self) -> Option<BigUint> {
        self.gas_price
            .as_ref()
            .and_then(Quantity::to_biguint)
            .or_else(|| self.effective_gas_price.as_ref().and_then(Quantity::to_biguint))
    }

    /// Block timestamp in milliseconds, if present and parseable
    pub fn timestamp_millis(&self) -> Option<i64> {
        self.timestamp.as_ref().and_then(BlockTimestamp::as_millis)
    }
}

/// Integer amount as sent by the provider: a JSON number, a decimal string
/// or a `0x`-prefixed hex string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Integer(u64),
    Text(String),
    /// Fractional, negative or out-of-range numbers. Never treated as an integer.
    Float(f64),
}

impl Quantity {
    pub fn to_biguint(&self) -> Option<BigUint> {
        match self {
            Quantity::Integer(value) => Some(BigUint::from(*value)),
            Quantity::Text(text) => parse_integer_text(text.trim()),
            Quantity::Float(_) => None,
        }
    }
}

fn parse_integer_text(text: &str) -> Option<BigUint> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        return BigUint::parse_bytes(hex.as_bytes(), 16);
    }

    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    BigUint::parse_bytes(text.as_bytes(), 10)
}

/// Block timestamp as sent by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockTimestamp {
    Millis(i64),
    /// Digits, or an RFC 3339 date-time
    Text(String),
    Float(f64),
}

impl BlockTimestamp {
    pub fn as_millis(&self) -> Option<i64> {
        match self {
            BlockTimestamp::Millis(millis) => Some(*millis),
            BlockTimestamp::Text(text) => {
                let text = text.trim();
                if let Ok(millis) = text.parse::<i64>() {
                    return Some(millis);
                }
                DateTime::parse_from_rfc3339(text)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc).timestamp_millis())
            }
            BlockTimestamp::Float(value) => {
                let in_range = value.is_finite()
                    && value.fract() == 0.0
                    && *value >= i64::MIN as f64
                    && *value <= i64::MAX as f64;
                in_range.then(|| *value as i64)
            }
        }
    }
}

/// Fiat price point returned by the historical-price provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub value: Decimal,

    #[serde(default)]
    pub timestamp: Option<BlockTimestamp>,
}

/// Cost of one successfully processed transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionCost {
    pub hash: String,

    /// Block timestamp in milliseconds since the epoch
    pub timestamp: i64,

    /// Exact cost in the smallest native unit
    #[serde(with = "biguint_string")]
    pub cost_wei: BigUint,

    /// Cost in the native display unit (approximate)
    pub cost_native: Decimal,

    /// Cost in fiat at the price used
    pub cost_fiat: Decimal,

    #[serde(with = "biguint_string")]
    pub gas_used: BigUint,

    #[serde(with = "biguint_string")]
    pub gas_price: BigUint,

    /// Fiat price of one native unit applied to this transaction
    pub price: Decimal,

    /// True when the price was carried over from an earlier transaction
    pub used_fallback_price: bool,
}

/// Gas expenditure for one address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    /// Exact sum of every included transaction's smallest-unit cost
    #[serde(with = "biguint_string")]
    pub total_cost_wei: BigUint,

    pub total_cost_native: Decimal,

    pub total_cost_fiat: Decimal,

    /// Included transactions, newest first
    pub transactions: Vec<TransactionCost>,

    pub statistics: Statistics,
}

/// Serializes a `BigUint` as a decimal string so JSON consumers never round it.
pub mod biguint_string {
    use num_bigint::BigUint;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse::<BigUint>().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primary_fields_win_over_legacy_fields() {
        let tx: RawTransaction = serde_json::from_value(json!({
            "hash": "0xabc",
            "gasUsed": "21000",
            "gas": "50000",
            "gasPrice": "1000000000",
            "effectiveGasPrice": "2000000000",
            "timestamp": 1_700_000_000_000i64
        }))
        .unwrap();

        assert_eq!(tx.resolved_gas_used(), Some(BigUint::from(21_000u32)));
        assert_eq!(tx.resolved_gas_price(), Some(BigUint::from(1_000_000_000u64)));
        assert_eq!(tx.timestamp_millis(), Some(1_700_000_000_000));
    }

    #[test]
    fn test_legacy_fields_are_used_when_primary_missing() {
        let tx: RawTransaction = serde_json::from_value(json!({
            "transactionHash": "0xdef",
            "gas": 21000,
            "effectiveGasPrice": "0x3b9aca00",
            "timestamp": "1700000000000"
        }))
        .unwrap();

        assert_eq!(tx.hash, "0xdef");
        assert_eq!(tx.resolved_gas_used(), Some(BigUint::from(21_000u32)));
        assert_eq!(tx.resolved_gas_price(), Some(BigUint::from(1_000_000_000u64)));
        assert_eq!(tx.timestamp_millis(), Some(1_700_000_000_000));
    }

    #[test]
    fn test_unparseable_primary_falls_back_to_legacy() {
        let tx: RawTransaction = serde_json::from_value(json!({
            "hash": "0x1",
            "gasUsed": "not a number",
            "gas": "42"
        }))
        .unwrap();

        assert_eq!(tx.resolved_gas_used(), Some(BigUint::from(42u32)));
        assert_eq!(tx.resolved_gas_price(), None);
        assert_eq!(tx.timestamp_millis(), None);
    }

    #[test]
    fn test_fractional_quantities_are_rejected() {
        assert_eq!(Quantity::Float(21000.5).to_biguint(), None);
        assert_eq!(Quantity::Text("21000.0".to_string()).to_biguint(), None);
        assert_eq!(Quantity::Text("-5".to_string()).to_biguint(), None);
        assert_eq!(Quantity::Text("0x".to_string()).to_biguint(), None);
        assert_eq!(Quantity::Text("".to_string()).to_biguint(), None);
    }

    #[test]
    fn test_large_string_quantity_is_exact() {
        let text = "340282366920938463463374607431768211457"; // u128::MAX + 2
        let value = Quantity::Text(text.to_string()).to_biguint().unwrap();
        assert_eq!(value.to_string(), text);
    }

    #[test]
    fn test_rfc3339_timestamp() {
        let ts = BlockTimestamp::Text("2024-01-01T00:00:00Z".to_string());
        assert_eq!(ts.as_millis(), Some(1_704_067_200_000));
        assert_eq!(BlockTimestamp::Text("yesterday".to_string()).as_millis(), None);
        assert_eq!(BlockTimestamp::Float(1.5).as_millis(), None);
        assert_eq!(BlockTimestamp::Float(1_000.0).as_millis(), Some(1_000));
    }

    #[test]
    fn test_price_point_accepts_number_and_string() {
        let from_number: PricePoint = serde_json::from_str(r#"{"value": 2345.67}"#).unwrap();
        let from_string: PricePoint = serde_json::from_str(r#"{"value": "2345.67"}"#).unwrap();
        assert_eq!(from_number.value, from_string.value);
    }

    #[test]
    fn test_big_integers_serialize_as_strings() {
        let cost = TransactionCost {
            hash: "0x1".to_string(),
            timestamp: 1,
            cost_wei: "123456789012345678901234567890".parse().unwrap(),
            cost_native: Decimal::ONE,
            cost_fiat: Decimal::ONE,
            gas_used: BigUint::from(21_000u32),
            gas_price: BigUint::from(7u32),
            price: Decimal::ONE,
            used_fallback_price: false,
        };

        let value = serde_json::to_value(&cost).unwrap();
        assert_eq!(value["cost_wei"], json!("123456789012345678901234567890"));
        assert_eq!(value["gas_used"], json!("21000"));

        let back: TransactionCost = serde_json::from_value(value).unwrap();
        assert_eq!(back, cost);
    }
}

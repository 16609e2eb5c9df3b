use num_bigint::BigUint;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Decimal places between the smallest native unit and the display unit (wei -> ETH)
pub const DEFAULT_UNIT_EXPONENT: u32 = 18;

/// Convert an amount in the smallest native unit to the display unit.
///
/// Exact while the amount fits `Decimal`'s 96-bit mantissa and the exponent is
/// at most 28. Anything larger goes through `f64` and loses precision, which is
/// acceptable because the result only feeds display and fiat figures.
pub fn to_native_units(amount: &BigUint, exponent: u32) -> Decimal {
    let exact = u128::try_from(amount)
        .ok()
        .and_then(|value| i128::try_from(value).ok())
        .and_then(|value| Decimal::try_from_i128_with_scale(value, exponent).ok());

    if let Some(value) = exact {
        return value.normalize();
    }

    let approx = amount.to_string().parse::<f64>().unwrap_or(f64::MAX) / 10f64.powi(exponent as i32);
    Decimal::from_f64_retain(approx).unwrap_or(Decimal::MAX)
}

/// Multiply a native amount by a fiat price, approximating through `f64` on overflow
pub fn to_fiat(native: Decimal, price: Decimal) -> Decimal {
    if let Some(value) = native.checked_mul(price) {
        return value;
    }

    let approx = native.to_f64().unwrap_or(0.0) * price.to_f64().unwrap_or(0.0);
    Decimal::from_f64_retain(approx).unwrap_or(if approx.is_sign_negative() {
        Decimal::MIN
    } else {
        Decimal::MAX
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_small_amounts_are_exact() {
        let amount = BigUint::from(1_000u32);
        assert_eq!(to_native_units(&amount, 18), dec!(0.000000000000001));
    }

    #[test]
    fn test_typical_transfer_cost() {
        // 21000 gas at 30 gwei
        let amount = BigUint::from(21_000u64 * 30_000_000_000u64);
        assert_eq!(to_native_units(&amount, 18), dec!(0.00063));
    }

    #[test]
    fn test_zero() {
        assert_eq!(to_native_units(&BigUint::from(0u32), 18), Decimal::ZERO);
    }

    #[test]
    fn test_amount_beyond_decimal_mantissa_is_approximated() {
        // 10^40 wei = 10^22 ETH, well past 2^96
        let amount = BigUint::from(10u32).pow(40);
        let native = to_native_units(&amount, 18);
        let expected = dec!(10000000000000000000000);
        let diff = (native - expected).abs();
        assert!(diff / expected < dec!(0.000001), "got {native}");
    }

    #[test]
    fn test_other_exponents() {
        let amount = BigUint::from(123_456u32);
        assert_eq!(to_native_units(&amount, 6), dec!(0.123456));
        assert_eq!(to_native_units(&amount, 0), dec!(123456));
    }

    #[test]
    fn test_to_fiat() {
        assert_eq!(to_fiat(dec!(0.00063), dec!(2000)), dec!(1.26));
        assert_eq!(to_fiat(Decimal::ZERO, dec!(2000)), Decimal::ZERO);
    }

    #[test]
    fn test_to_fiat_overflow_saturates_instead_of_panicking() {
        let value = to_fiat(Decimal::MAX, dec!(10));
        assert!(value > Decimal::ZERO);
    }
}

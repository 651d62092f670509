//! Decimal conversion arithmetic.
//!
//! Every conversion in the ledger rounds through here so that the resolver,
//! the composer and the validator agree to the last decimal place.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Decimal places kept on converted amounts.
pub const AMOUNT_SCALE: u32 = 4;

/// Conversion arithmetic with Banker's Rounding (MidpointNearestEven).
pub struct CurrencyService;

impl CurrencyService {
    /// Converts `amount` with `rate` (1 source = rate target), rounded to 4 dp.
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use ledgerly_core::currency::CurrencyService;
    ///
    /// assert_eq!(CurrencyService::convert(dec!(1000), dec!(300)), dec!(300000.0000));
    /// ```
    #[must_use]
    pub fn convert(amount: Decimal, rate: Decimal) -> Decimal {
        Self::round(amount * rate, AMOUNT_SCALE)
    }

    /// Recovers the original amount from a converted one: `amount / rate`, rounded to 4 dp.
    ///
    /// Returns `None` for a zero rate.
    #[must_use]
    pub fn unconvert(amount: Decimal, rate: Decimal) -> Option<Decimal> {
        amount
            .checked_div(rate)
            .map(|value| Self::round(value, AMOUNT_SCALE))
    }

    /// `1 / rate`, unrounded. `None` for a zero rate.
    #[must_use]
    pub fn inverse(rate: Decimal) -> Option<Decimal> {
        Decimal::ONE.checked_div(rate)
    }

    /// Rounds with Banker's Rounding.
    #[must_use]
    pub fn round(value: Decimal, decimal_places: u32) -> Decimal {
        value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_convert_rounds_to_4_decimals() {
        // 100 * 1.23456789 = 123.456789
        assert_eq!(CurrencyService::convert(dec!(100), dec!(1.23456789)), dec!(123.4568));
    }

    #[test]
    fn test_bankers_rounding_midpoint_to_even() {
        assert_eq!(CurrencyService::round(dec!(2.5), 0), dec!(2));
        assert_eq!(CurrencyService::round(dec!(3.5), 0), dec!(4));
        assert_eq!(CurrencyService::round(dec!(2.25), 1), dec!(2.2));
        assert_eq!(CurrencyService::round(dec!(2.35), 1), dec!(2.4));
    }

    #[test]
    fn test_unconvert_recovers_original() {
        let inverse = CurrencyService::inverse(dec!(300)).unwrap();
        assert_eq!(CurrencyService::unconvert(dec!(1000), inverse), Some(dec!(300000.0000)));
        assert_eq!(CurrencyService::unconvert(dec!(300000), dec!(300)), Some(dec!(1000.0000)));
    }

    #[test]
    fn test_zero_rate_has_no_inverse() {
        assert_eq!(CurrencyService::inverse(Decimal::ZERO), None);
        assert_eq!(CurrencyService::unconvert(dec!(10), Decimal::ZERO), None);
    }
}

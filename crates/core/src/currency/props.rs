//! Property-based tests for currency conversion.
//!
//! - Conversion rounds to 4 decimal places with Banker's Rounding
//! - Converting A→B then B→A at the inverse rate recovers the amount

use std::sync::Arc;

use chrono::NaiveDate;
use ledgerly_shared::types::CurrencyCode;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::cache::RateCache;
use super::exchange::ExchangeRate;
use super::resolver::ExchangeRateResolver;
use super::service::CurrencyService;
use crate::ledger::validation::BALANCE_TOLERANCE;
use crate::memory::InMemoryStore;

/// Strategy to generate positive decimal amounts (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate exchange rates (0.0100 to 1000.0000).
fn moderate_rate() -> impl Strategy<Value = Decimal> {
    (100i64..10_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Conversion result never carries more than 4 decimal places.
    #[test]
    fn prop_convert_rounds_to_4_decimals(
        amount in positive_amount(),
        rate in moderate_rate(),
    ) {
        let result = CurrencyService::convert(amount, rate);
        prop_assert!(result.scale() <= 4, "{} has more than 4 decimals", result);
    }

    /// Rate 1 preserves the amount.
    #[test]
    fn prop_unit_rate_preserves_amount(amount in positive_amount()) {
        prop_assert_eq!(CurrencyService::convert(amount, Decimal::ONE), amount);
    }

    /// convert(X, A, B) then convert(result, B, A) lands within tolerance of X
    /// when B→A is cached as 1/rate.
    #[test]
    fn prop_round_trip_through_inverse_rate(
        amount in positive_amount(),
        rate in moderate_rate(),
    ) {
        let usd = CurrencyCode::parse("USD").unwrap();
        let lkr = CurrencyCode::parse("LKR").unwrap();
        let day = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let forward = ExchangeRate::new(usd.clone(), lkr.clone(), rate, day);
        let backward = forward.inverse().unwrap();

        let back = runtime().block_on(async {
            let store = Arc::new(InMemoryStore::new());
            store.upsert_many(&[forward, backward]).await.unwrap();
            let resolver = ExchangeRateResolver::new(store, Vec::new());

            let there = resolver.convert(amount, &usd, &lkr, day).await.unwrap();
            resolver
                .convert(there.converted_amount, &lkr, &usd, day)
                .await
                .unwrap()
                .converted_amount
        });

        prop_assert!(
            (back - amount).abs() <= BALANCE_TOLERANCE,
            "{} came back as {}",
            amount,
            back
        );
    }
}

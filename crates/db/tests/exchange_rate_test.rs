//! Integration tests for ExchangeRateRepository.

mod common;

use chrono::NaiveDate;
use ledgerly_core::currency::{CacheWrite, ExchangeRate, RateCache};
use ledgerly_db::ExchangeRateRepository;
use rust_decimal_macros::dec;
use uuid::Uuid;

use common::{code, setup};

/// A date no other test run uses, so keys never collide.
fn unique_date() -> NaiveDate {
    let bytes = Uuid::new_v4().into_bytes();
    let offset = u64::from(u16::from_le_bytes([bytes[0], bytes[1]]));
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap() + chrono::Days::new(offset)
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_insert_is_first_write_wins() {
    let db = setup().await;
    let repo = ExchangeRateRepository::new(db);
    let date = unique_date();
    let (xau, xag) = (code("XAU"), code("XAG"));

    let first = ExchangeRate::new(xau.clone(), xag.clone(), dec!(80.5), date);
    let second = ExchangeRate::new(xau.clone(), xag.clone(), dec!(99), date);

    let initial = repo.insert(&first).await.unwrap();
    let duplicate = repo.insert(&second).await.unwrap();
    assert!(matches!(initial, CacheWrite::Inserted | CacheWrite::AlreadyPresent));
    assert_eq!(duplicate, CacheWrite::AlreadyPresent);

    let stored = repo.get(&xau, &xag, date).await.unwrap().unwrap();
    assert_ne!(stored, dec!(99));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_upsert_many_overwrites() {
    let db = setup().await;
    let repo = ExchangeRateRepository::new(db);
    let date = unique_date();
    let (xpt, xpd) = (code("XPT"), code("XPD"));

    repo.insert(&ExchangeRate::new(xpt.clone(), xpd.clone(), dec!(1.1), date))
        .await
        .unwrap();
    let written = repo
        .upsert_many(&[ExchangeRate::new(xpt.clone(), xpd.clone(), dec!(0.0033333333), date)])
        .await
        .unwrap();

    assert_eq!(written, 1);
    assert_eq!(repo.get(&xpt, &xpd, date).await.unwrap(), Some(dec!(0.0033333333)));
    assert_eq!(repo.upsert_many(&[]).await.unwrap(), 0);
}

//! Exchange rate repository: the durable rate cache.
//!
//! Rows are keyed by (from_currency, to_currency, rate_date). Resolution
//! writes are first-write-wins; only the bulk refresh overwrites.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use ledgerly_core::currency::{CacheWrite, ExchangeRate, RateCache, RateError};
use ledgerly_shared::types::{CurrencyCode, ExchangeRateId};
use rust_decimal::Decimal;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set, SqlErr,
    TransactionTrait,
};
use tracing::debug;

use super::mapping::cache_err;
use crate::entities::exchange_rates;

/// PostgreSQL-backed [`RateCache`].
#[derive(Debug, Clone)]
pub struct ExchangeRateRepository {
    db: DatabaseConnection,
}

impl ExchangeRateRepository {
    /// Creates a new exchange rate repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn active_model(rate: &ExchangeRate) -> exchange_rates::ActiveModel {
    exchange_rates::ActiveModel {
        id: Set(ExchangeRateId::new().into_inner()),
        from_currency: Set(rate.from_currency.as_str().to_string()),
        to_currency: Set(rate.to_currency.as_str().to_string()),
        rate_date: Set(rate.rate_date),
        rate: Set(rate.rate),
        created_at: Set(Utc::now().into()),
    }
}

fn pair_date_conflict() -> OnConflict {
    OnConflict::columns([
        exchange_rates::Column::FromCurrency,
        exchange_rates::Column::ToCurrency,
        exchange_rates::Column::RateDate,
    ])
    .to_owned()
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[async_trait]
impl RateCache for ExchangeRateRepository {
    async fn get(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
        date: NaiveDate,
    ) -> Result<Option<Decimal>, RateError> {
        let row = exchange_rates::Entity::find()
            .filter(exchange_rates::Column::FromCurrency.eq(from.as_str()))
            .filter(exchange_rates::Column::ToCurrency.eq(to.as_str()))
            .filter(exchange_rates::Column::RateDate.eq(date))
            .one(&self.db)
            .await
            .map_err(cache_err)?;

        Ok(row.map(|row| row.rate))
    }

    async fn insert(&self, rate: &ExchangeRate) -> Result<CacheWrite, RateError> {
        let result = exchange_rates::Entity::insert(active_model(rate))
            .on_conflict(pair_date_conflict().do_nothing().to_owned())
            .exec_without_returning(&self.db)
            .await;

        match result {
            Ok(0) => {
                debug!(from = %rate.from_currency, to = %rate.to_currency, date = %rate.rate_date, "Rate already cached");
                Ok(CacheWrite::AlreadyPresent)
            }
            Ok(_) => Ok(CacheWrite::Inserted),
            Err(DbErr::RecordNotInserted) => Ok(CacheWrite::AlreadyPresent),
            Err(err) if is_unique_violation(&err) => Ok(CacheWrite::AlreadyPresent),
            Err(err) => Err(cache_err(err)),
        }
    }

    async fn upsert_many(&self, rates: &[ExchangeRate]) -> Result<usize, RateError> {
        if rates.is_empty() {
            return Ok(0);
        }

        let txn = self.db.begin().await.map_err(cache_err)?;
        exchange_rates::Entity::insert_many(rates.iter().map(active_model))
            .on_conflict(
                pair_date_conflict()
                    .update_column(exchange_rates::Column::Rate)
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
            .map_err(cache_err)?;
        txn.commit().await.map_err(cache_err)?;

        Ok(rates.len())
    }
}

//! Feed document parsing.
//!
//! Rate documents look like
//! `{"date": "2026-03-01", "usd": {"lkr": 300.5, "eur": 0.92, ...}}` and
//! currency lists like `{"usd": "US Dollar", ...}`. Codes are lower-case on
//! the wire. Entries that are not three-letter codes (crypto tickers and the
//! like) or not numbers are skipped.

use std::str::FromStr;

use chrono::NaiveDate;
use ledgerly_core::currency::{CurrencyInfo, RateTable};
use ledgerly_shared::types::CurrencyCode;
use rust_decimal::Decimal;
use serde_json::{Number, Value};

use crate::error::FeedError;

/// Parses a JSON number through its text form so no float arithmetic is involved.
fn decimal_from_number(number: &Number) -> Option<Decimal> {
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Parses the rate table published for `base`.
pub fn parse_rate_table(base: &CurrencyCode, body: &Value) -> Result<RateTable, FeedError> {
    let rates = body
        .get(base.to_lowercase())
        .and_then(Value::as_object)
        .ok_or_else(|| FeedError::InvalidData(format!("missing '{}' rate object", base.to_lowercase())))?;

    let mut table = RateTable::new(base.clone());
    table.date = body
        .get("date")
        .and_then(Value::as_str)
        .and_then(|date| NaiveDate::from_str(date).ok());

    for (code, value) in rates {
        let (Ok(code), Some(rate)) = (
            CurrencyCode::parse(code),
            value.as_number().and_then(decimal_from_number),
        ) else {
            continue;
        };
        table.rates.insert(code, rate);
    }

    Ok(table)
}

/// Parses the code → name listing.
pub fn parse_currency_list(body: &Value) -> Result<Vec<CurrencyInfo>, FeedError> {
    let listing = body
        .as_object()
        .ok_or_else(|| FeedError::InvalidData("currency listing is not an object".to_string()))?;

    Ok(listing
        .iter()
        .filter_map(|(code, name)| {
            let code = CurrencyCode::parse(code).ok()?;
            let name = name.as_str().filter(|n| !n.is_empty()).unwrap_or(code.as_str()).to_string();
            Some(CurrencyInfo::new(code, name))
        })
        .collect())
}

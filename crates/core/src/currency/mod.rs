//! Multi-currency valuation: conversion arithmetic, rate sources, and the
//! caching resolver.

pub mod cache;
pub mod error;
pub mod exchange;
pub mod resolver;
pub mod service;
pub mod source;

#[cfg(test)]
mod props;

pub use cache::{CacheWrite, RateCache};
pub use error::RateError;
pub use exchange::{Conversion, CurrencyInfo, ExchangeRate};
pub use resolver::ExchangeRateResolver;
pub use service::{AMOUNT_SCALE, CurrencyService};
pub use source::{QuoteSource, RateTable};

//! Core business logic for Ledgerly.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence and rate feeds sit behind the traits defined here.
//!
//! # Modules
//!
//! - `ledger` - Double-entry validation, composition and the executor contract
//! - `tags` - Virtual tag balances inside accounts
//! - `currency` - Conversion arithmetic and the exchange rate resolver
//! - `memory` - In-memory store implementing every store trait

pub mod currency;
pub mod ledger;
pub mod memory;
pub mod tags;

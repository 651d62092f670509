//! Shared types, errors, and configuration for Ledgerly.
//!
//! This crate provides common types used across all other crates:
//! - Validated currency codes
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use self::config::{AllocationMode, AppConfig, LedgerConfig, RatesConfig};
pub use error::{AppError, AppResult};

//! Core domain types and logic.

pub mod calendar;
pub mod chart;
pub mod config_validation;
pub mod error;
pub mod indicator;
pub mod ledger;
pub mod ohlcv;
pub mod period;
pub mod portfolio;
pub mod pricing;
pub mod rebalance;
pub mod registry;
pub mod transaction;
pub mod valuation;

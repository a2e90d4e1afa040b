//! Concrete adapter implementations for ports.

pub mod csv_market_adapter;
pub mod csv_portfolio_store;
pub mod file_config_adapter;

//! Close-price lookup with bounded fallback.

use chrono::NaiveDate;

use super::error::StockfolioError;
use crate::ports::market_data_port::MarketDataPort;

/// Days searched either side of a date when it has no bar of its own.
pub const DEFAULT_FALLBACK_DAYS: u32 = 7;

pub fn close_price(
    market: &dyn MarketDataPort,
    symbol: &str,
    date: NaiveDate,
    fallback_days: u32,
) -> Result<f64, StockfolioError> {
    market
        .nearest_bar(symbol, date, fallback_days)?
        .map(|bar| bar.close)
        .ok_or_else(|| StockfolioError::NoPriceData {
            symbol: symbol.to_string(),
            date,
        })
}

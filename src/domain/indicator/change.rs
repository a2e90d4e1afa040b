//! Gain or loss of a single instrument between two dates.

use chrono::NaiveDate;

use crate::domain::error::StockfolioError;
use crate::domain::pricing::close_price;
use crate::ports::market_data_port::MarketDataPort;

/// `close(end) - close(start)`, each close taken with the usual fallback.
pub fn price_change(
    market: &dyn MarketDataPort,
    symbol: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    fallback_days: u32,
) -> Result<f64, StockfolioError> {
    if end_date < start_date {
        return Err(StockfolioError::InvalidDateRange {
            start: start_date,
            end: end_date,
        });
    }
    let start_close = close_price(market, symbol, start_date, fallback_days)?;
    let end_close = close_price(market, symbol, end_date, fallback_days)?;
    Ok(end_close - start_close)
}

//! Calendar-window simple moving average of closing prices.
//!
//! The window covers `window_days` calendar days ending on the given date.
//! Only closes actually present are averaged; non-trading days are absent,
//! not interpolated.

use chrono::{Duration, NaiveDate};

use crate::domain::error::StockfolioError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::market_data_port::MarketDataPort;

pub fn moving_average(
    market: &dyn MarketDataPort,
    symbol: &str,
    end_date: NaiveDate,
    window_days: i64,
) -> Result<f64, StockfolioError> {
    if window_days < 1 {
        return Err(StockfolioError::InvalidParameter {
            reason: format!("moving average window must be at least 1 day, got {window_days}"),
        });
    }
    // A window reaching past the earliest representable date covers all history.
    let start_date = Duration::try_days(window_days - 1)
        .and_then(|span| end_date.checked_sub_signed(span))
        .unwrap_or(NaiveDate::MIN);
    let bars = market.fetch_range(symbol, start_date, end_date)?;
    mean_close(&bars).ok_or_else(|| StockfolioError::NoDataInRange {
        symbol: symbol.to_string(),
        start: start_date,
        end: end_date,
    })
}

pub fn mean_close(bars: &[OhlcvBar]) -> Option<f64> {
    if bars.is_empty() {
        return None;
    }
    Some(bars.iter().map(|b| b.close).sum::<f64>() / bars.len() as f64)
}

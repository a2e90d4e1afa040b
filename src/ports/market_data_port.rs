//! Market data access port trait.

use crate::domain::error::StockfolioError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::{Duration, NaiveDate};

pub trait MarketDataPort {
    /// Daily bars for `symbol` within `[start_date, end_date]`, sorted by date.
    /// Days without data are simply absent.
    fn fetch_range(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, StockfolioError>;

    fn is_valid_symbol(&self, symbol: &str) -> bool;

    /// Default implementation: a one-day range query.
    fn fetch_bar(&self, symbol: &str, date: NaiveDate) -> Result<Option<OhlcvBar>, StockfolioError> {
        Ok(self.fetch_range(symbol, date, date)?.into_iter().next())
    }

    /// Nearest bar to `date`, searching `date`, then one day before and after,
    /// then two, out to `window_days`. Earlier dates win ties.
    fn nearest_bar(
        &self,
        symbol: &str,
        date: NaiveDate,
        window_days: u32,
    ) -> Result<Option<OhlcvBar>, StockfolioError> {
        if let Some(bar) = self.fetch_bar(symbol, date)? {
            return Ok(Some(bar));
        }
        for offset in 1..=i64::from(window_days) {
            let step = Duration::days(offset);
            for candidate in [date - step, date + step] {
                if let Some(bar) = self.fetch_bar(symbol, candidate)? {
                    return Ok(Some(bar));
                }
            }
        }
        Ok(None)
    }
}

//! Close-versus-moving-average crossovers.
//!
//! A crossover is recorded on a trading date when the previous close and the
//! current close sit strictly on opposite sides of the moving average ending
//! on the current date. Touching the average never counts.

use chrono::NaiveDate;

use super::sma::moving_average;
use crate::domain::error::StockfolioError;
use crate::ports::market_data_port::MarketDataPort;

pub fn crossovers(
    market: &dyn MarketDataPort,
    symbol: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    window_days: i64,
) -> Result<Vec<NaiveDate>, StockfolioError> {
    if window_days < 0 {
        return Err(StockfolioError::InvalidParameter {
            reason: format!("crossover window must not be negative, got {window_days}"),
        });
    }
    if window_days == 0 {
        return Ok(vec![]);
    }
    if end_date < start_date {
        return Err(StockfolioError::InvalidDateRange {
            start: start_date,
            end: end_date,
        });
    }

    let mut bars = market.fetch_range(symbol, start_date, end_date)?;
    bars.sort_by_key(|b| b.date);
    bars.dedup_by_key(|b| b.date);

    let first = usize::try_from(window_days - 1).unwrap_or(usize::MAX).max(1);
    let mut dates = Vec::new();

    for i in first..bars.len() {
        let average = moving_average(market, symbol, bars[i].date, window_days)?;
        let prev = bars[i - 1].close;
        let curr = bars[i].close;
        if is_cross(prev, curr, average) {
            dates.push(bars[i].date);
        }
    }

    Ok(dates)
}

fn is_cross(prev: f64, curr: f64, average: f64) -> bool {
    (prev < average && curr > average) || (prev > average && curr < average)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::OhlcvBar;
    use chrono::Duration;
    use std::collections::BTreeMap;

    struct Closes(BTreeMap<NaiveDate, f64>);

    impl MarketDataPort for Closes {
        fn fetch_range(
            &self,
            symbol: &str,
            start_date: NaiveDate,
            end_date: NaiveDate,
        ) -> Result<Vec<OhlcvBar>, StockfolioError> {
            Ok(self
                .0
                .range(start_date..=end_date)
                .map(|(&date, &close)| OhlcvBar::from_close(symbol, date, close))
                .collect())
        }

        fn is_valid_symbol(&self, _symbol: &str) -> bool {
            true
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn consecutive(start: NaiveDate, closes: &[f64]) -> Closes {
        Closes(
            closes
                .iter()
                .enumerate()
                .map(|(i, &c)| (start + Duration::days(i as i64), c))
                .collect(),
        )
    }

    #[test]
    fn strict_inequality() {
        assert!(is_cross(9.0, 11.0, 10.0));
        assert!(is_cross(11.0, 9.0, 10.0));
        assert!(!is_cross(10.0, 11.0, 10.0));
        assert!(!is_cross(9.0, 10.0, 10.0));
        assert!(!is_cross(11.0, 12.0, 10.0));
    }

    #[test]
    fn detects_up_and_down_crosses() {
        let start = d(2024, 3, 1);
        let market = consecutive(start, &[10.0, 10.0, 10.0, 20.0, 20.0, 5.0]);
        // window 2: avg(i) = mean(close[i-1], close[i])
        // i=3: avg 15, 10 -> 20 crosses up
        // i=4: avg 20, 20 -> 20 no
        // i=5: avg 12.5, 20 -> 5 crosses down
        let dates = crossovers(&market, "X", start, start + Duration::days(5), 2).unwrap();
        assert_eq!(dates, vec![d(2024, 3, 4), d(2024, 3, 6)]);
    }

    #[test]
    fn window_one_compares_against_own_close() {
        let start = d(2024, 3, 1);
        let market = consecutive(start, &[10.0, 20.0, 5.0]);
        // The average equals the current close, so nothing is strictly crossed.
        let dates = crossovers(&market, "X", start, start + Duration::days(2), 1).unwrap();
        assert!(dates.is_empty());
    }

    #[test]
    fn zero_window_is_empty() {
        let start = d(2024, 3, 1);
        let market = consecutive(start, &[10.0, 20.0, 5.0]);
        assert!(crossovers(&market, "X", start, start, 0).unwrap().is_empty());
    }

    #[test]
    fn negative_window_rejected() {
        let start = d(2024, 3, 1);
        let market = consecutive(start, &[10.0]);
        let err = crossovers(&market, "X", start, start, -1).unwrap_err();
        assert!(matches!(err, StockfolioError::InvalidParameter { .. }));
    }

    #[test]
    fn reversed_range_rejected() {
        let start = d(2024, 3, 5);
        let market = consecutive(start, &[10.0]);
        let err = crossovers(&market, "X", start, d(2024, 3, 1), 3).unwrap_err();
        assert!(matches!(err, StockfolioError::InvalidDateRange { .. }));
    }

    #[test]
    fn window_longer_than_data_yields_nothing() {
        let start = d(2024, 3, 1);
        let market = consecutive(start, &[10.0, 30.0]);
        let dates = crossovers(&market, "X", start, start + Duration::days(1), 5).unwrap();
        assert!(dates.is_empty());
    }
}

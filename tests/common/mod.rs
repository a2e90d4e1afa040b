#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use std::collections::{BTreeMap, HashMap};
use stockfolio::domain::error::StockfolioError;
pub use stockfolio::domain::ohlcv::OhlcvBar;
use stockfolio::ports::market_data_port::MarketDataPort;

pub struct MockMarketData {
    pub data: HashMap<String, BTreeMap<NaiveDate, OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        let series = self.data.entry(symbol.to_string()).or_default();
        for bar in bars {
            series.insert(bar.date, bar);
        }
        self
    }

    /// Closes as `(YYYY-MM-DD, close)` pairs.
    pub fn with_closes(self, symbol: &str, closes: &[(&str, f64)]) -> Self {
        let bars = closes
            .iter()
            .map(|(d, c)| OhlcvBar::from_close(symbol, date(d), *c))
            .collect();
        self.with_bars(symbol, bars)
    }

    /// The same close on every calendar day of `[start, end]`.
    pub fn with_flat(self, symbol: &str, start: &str, end: &str, close: f64) -> Self {
        let bars = days(date(start), date(end))
            .map(|d| OhlcvBar::from_close(symbol, d, close))
            .collect();
        self.with_bars(symbol, bars)
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl MarketDataPort for MockMarketData {
    fn fetch_range(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, StockfolioError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(StockfolioError::MarketData {
                reason: reason.clone(),
            });
        }
        if end_date < start_date {
            return Ok(Vec::new());
        }
        Ok(self
            .data
            .get(symbol)
            .map(|series| series.range(start_date..=end_date).map(|(_, b)| b.clone()).collect())
            .unwrap_or_default())
    }

    fn is_valid_symbol(&self, symbol: &str) -> bool {
        self.data.contains_key(symbol) || self.errors.contains_key(symbol)
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn days(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let span = (end - start).num_days().max(-1);
    (0..=span).map(move |i| start + Duration::days(i))
}

/// Closes following `base + step * i` on each calendar day from `start`.
pub fn linear_closes(symbol: &str, start: &str, count: usize, base: f64, step: f64) -> Vec<OhlcvBar> {
    let start = date(start);
    (0..count)
        .map(|i| OhlcvBar::from_close(symbol, start + Duration::days(i as i64), base + step * i as f64))
        .collect()
}

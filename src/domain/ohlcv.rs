//! Daily OHLCV bar representation.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl OhlcvBar {
    /// Bar with all four prices set to `close`, used where only closes matter.
    pub fn from_close(symbol: &str, date: NaiveDate, close: f64) -> Self {
        OhlcvBar {
            symbol: symbol.to_string(),
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0,
        }
    }
}

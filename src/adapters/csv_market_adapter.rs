//! CSV file market data adapter.
//!
//! One file per symbol, `<SYMBOL>.csv`, with a header row and columns
//! `timestamp,open,high,low,close,volume` in any row order. Parsed series are
//! cached in memory for the adapter's lifetime.

use crate::domain::error::StockfolioError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::market_data_port::MarketDataPort;
use chrono::NaiveDate;
use csv::StringRecord;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

pub struct CsvMarketAdapter {
    base_path: PathBuf,
    cache: RefCell<HashMap<String, Vec<OhlcvBar>>>,
}

impl CsvMarketAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            base_path,
            cache: RefCell::new(HashMap::new()),
        }
    }

    fn csv_path(&self, symbol: &str) -> Option<PathBuf> {
        let plain = !symbol.is_empty()
            && symbol
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
            && !symbol.starts_with('.');
        plain.then(|| self.base_path.join(format!("{}.csv", symbol)))
    }

    fn ensure_loaded(&self, symbol: &str) -> Result<(), StockfolioError> {
        if self.cache.borrow().contains_key(symbol) {
            return Ok(());
        }
        let bars = self.read_series(symbol)?;
        self.cache.borrow_mut().insert(symbol.to_string(), bars);
        Ok(())
    }

    fn read_series(&self, symbol: &str) -> Result<Vec<OhlcvBar>, StockfolioError> {
        let path = self
            .csv_path(symbol)
            .ok_or_else(|| StockfolioError::MarketData {
                reason: format!("invalid symbol '{}'", symbol),
            })?;
        let content = fs::read_to_string(&path).map_err(|e| StockfolioError::MarketData {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| StockfolioError::MarketData {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;
            match parse_bar(symbol, &record) {
                Some(bar) => bars.push(bar),
                None => tracing::warn!(symbol, row = row + 2, "skipping malformed price row"),
            }
        }

        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        tracing::debug!(symbol, bars = bars.len(), file = %path.display(), "loaded price series");
        Ok(bars)
    }
}

fn parse_bar(symbol: &str, record: &StringRecord) -> Option<OhlcvBar> {
    let date = NaiveDate::parse_from_str(record.get(0)?.trim(), "%Y-%m-%d").ok()?;
    let price = |i: usize| record.get(i)?.trim().parse::<f64>().ok();
    let volume = record.get(5)?.trim();
    let volume = volume
        .parse::<i64>()
        .ok()
        .or_else(|| volume.parse::<f64>().ok().map(|v| v as i64))?;

    Some(OhlcvBar {
        symbol: symbol.to_string(),
        date,
        open: price(1)?,
        high: price(2)?,
        low: price(3)?,
        close: price(4)?,
        volume,
    })
}

impl MarketDataPort for CsvMarketAdapter {
    fn fetch_range(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, StockfolioError> {
        self.ensure_loaded(symbol)?;
        let cache = self.cache.borrow();
        let bars = cache.get(symbol).map(Vec::as_slice).unwrap_or(&[]);
        let from = bars.partition_point(|b| b.date < start_date);
        let to = bars.partition_point(|b| b.date <= end_date);
        Ok(bars.get(from..to).map(<[OhlcvBar]>::to_vec).unwrap_or_default())
    }

    fn is_valid_symbol(&self, symbol: &str) -> bool {
        self.cache.borrow().contains_key(symbol)
            || self.csv_path(symbol).is_some_and(|p| p.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        // Newest first, as daily download files usually are.
        let csv_content = "timestamp,open,high,low,close,volume\n\
            2024-06-11,150.5,152.0,149.0,151.0,61000\n\
            2024-06-10,148.0,151.0,147.5,150.0,50000\n\
            not-a-date,1,1,1,1,1\n\
            2024-06-07,147.0,149.5,146.0,149.0,55000\n";

        fs::write(path.join("AAPL.csv"), csv_content).unwrap();
        fs::write(path.join("IBM.csv"), "timestamp,open,high,low,close,volume\n").unwrap();

        (dir, path)
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn fetch_range_sorted_and_filtered() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvMarketAdapter::new(path);

        let bars = adapter.fetch_range("AAPL", d(2024, 6, 8), d(2024, 6, 11)).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, d(2024, 6, 10));
        assert_eq!(bars[0].open, 148.0);
        assert_eq!(bars[0].close, 150.0);
        assert_eq!(bars[0].volume, 50000);
        assert_eq!(bars[1].date, d(2024, 6, 11));
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvMarketAdapter::new(path);
        let bars = adapter.fetch_range("AAPL", d(2024, 1, 1), d(2024, 12, 31)).unwrap();
        assert_eq!(bars.len(), 3);
    }

    #[test]
    fn fetch_bar_exact_day() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvMarketAdapter::new(path);
        assert!(adapter.fetch_bar("AAPL", d(2024, 6, 7)).unwrap().is_some());
        assert!(adapter.fetch_bar("AAPL", d(2024, 6, 8)).unwrap().is_none());
    }

    #[test]
    fn nearest_bar_uses_series() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvMarketAdapter::new(path);
        let bar = adapter.nearest_bar("AAPL", d(2024, 6, 9), 7).unwrap().unwrap();
        assert_eq!(bar.date, d(2024, 6, 10));
    }

    #[test]
    fn empty_file_gives_no_bars() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvMarketAdapter::new(path);
        assert!(adapter.fetch_range("IBM", d(2024, 1, 1), d(2024, 12, 31)).unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_an_error() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvMarketAdapter::new(path);
        let result = adapter.fetch_range("XYZ", d(2024, 1, 1), d(2024, 1, 31));
        assert!(matches!(result, Err(StockfolioError::MarketData { .. })));
    }

    #[test]
    fn symbol_validity_follows_files() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvMarketAdapter::new(path);
        assert!(adapter.is_valid_symbol("AAPL"));
        assert!(adapter.is_valid_symbol("IBM"));
        assert!(!adapter.is_valid_symbol("XYZ"));
        assert!(!adapter.is_valid_symbol("../AAPL"));
        assert!(!adapter.is_valid_symbol(""));
    }

    #[test]
    fn cached_series_survives_file_removal() {
        let (dir, path) = setup_test_data();
        let adapter = CsvMarketAdapter::new(path.clone());
        adapter.fetch_range("AAPL", d(2024, 6, 1), d(2024, 6, 30)).unwrap();
        fs::remove_file(path.join("AAPL.csv")).unwrap();
        assert_eq!(adapter.fetch_range("AAPL", d(2024, 6, 1), d(2024, 6, 30)).unwrap().len(), 3);
        drop(dir);
    }

    #[test]
    fn one_cache_entry_per_symbol() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvMarketAdapter::new(path);
        for day in 7..=11 {
            adapter.fetch_range("AAPL", d(2024, 6, day), d(2024, 6, day)).unwrap();
        }
        adapter.fetch_range("IBM", d(2024, 6, 1), d(2024, 6, 30)).unwrap();
        let cache = adapter.cache.borrow();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache["AAPL"].len(), 3);
    }

    #[test]
    fn reversed_range_is_empty() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvMarketAdapter::new(path);
        assert!(adapter.fetch_range("AAPL", d(2024, 6, 11), d(2024, 6, 7)).unwrap().is_empty());
    }
}

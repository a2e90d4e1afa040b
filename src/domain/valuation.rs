//! Portfolio valuation and weight distribution.
//!
//! Value on a date sums ledger records dated on or before it, each priced at
//! the close on the query date (with fallback), never at its own date.

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::error::StockfolioError;
use super::portfolio::Portfolio;
use super::pricing::{close_price, DEFAULT_FALLBACK_DAYS};
use crate::ports::market_data_port::MarketDataPort;

/// How SELL records contribute to portfolio value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValuationMode {
    /// Only the remaining quantity of BUY lots counts. Sales already drew
    /// those lots down, so SELL records are skipped.
    #[default]
    HeldLots,
    /// Every record counts at its positive quantity, SELL included.
    LedgerParity,
}

impl ValuationMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "held_lots" => Some(ValuationMode::HeldLots),
            "ledger_parity" => Some(ValuationMode::LedgerParity),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValuationConfig {
    pub mode: ValuationMode,
    pub fallback_days: u32,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        ValuationConfig {
            mode: ValuationMode::default(),
            fallback_days: DEFAULT_FALLBACK_DAYS,
        }
    }
}

/// Memoises close prices for a single query date.
struct PriceBook<'a> {
    market: &'a dyn MarketDataPort,
    date: NaiveDate,
    fallback_days: u32,
    closes: HashMap<String, f64>,
}

impl<'a> PriceBook<'a> {
    fn new(market: &'a dyn MarketDataPort, date: NaiveDate, fallback_days: u32) -> Self {
        PriceBook {
            market,
            date,
            fallback_days,
            closes: HashMap::new(),
        }
    }

    fn close(&mut self, symbol: &str) -> Result<f64, StockfolioError> {
        if let Some(&price) = self.closes.get(symbol) {
            return Ok(price);
        }
        let price = close_price(self.market, symbol, self.date, self.fallback_days)?;
        self.closes.insert(symbol.to_string(), price);
        Ok(price)
    }
}

pub fn portfolio_value(
    portfolio: &Portfolio,
    market: &dyn MarketDataPort,
    config: &ValuationConfig,
    date: NaiveDate,
) -> Result<f64, StockfolioError> {
    let mut prices = PriceBook::new(market, date, config.fallback_days);
    value_with(portfolio, &mut prices, config.mode)
}

fn value_with(
    portfolio: &Portfolio,
    prices: &mut PriceBook<'_>,
    mode: ValuationMode,
) -> Result<f64, StockfolioError> {
    let mut total = 0.0;
    for tx in portfolio.ledger().transactions() {
        if tx.date > prices.date {
            continue;
        }
        if mode == ValuationMode::HeldLots && !tx.is_buy() {
            continue;
        }
        total += tx.quantity * prices.close(&tx.symbol)?;
    }
    Ok(total)
}

/// Share of total value held in each instrument, as a fraction of 1.
pub fn distribution(
    portfolio: &Portfolio,
    market: &dyn MarketDataPort,
    config: &ValuationConfig,
    date: NaiveDate,
) -> Result<BTreeMap<String, f64>, StockfolioError> {
    let mut prices = PriceBook::new(market, date, config.fallback_days);
    let total = value_with(portfolio, &mut prices, config.mode)?;
    if total.abs() < f64::EPSILON {
        return Err(StockfolioError::ZeroPortfolioValue { date });
    }
    weights_with(portfolio, &mut prices, total)
}

fn weights_with(
    portfolio: &Portfolio,
    prices: &mut PriceBook<'_>,
    total: f64,
) -> Result<BTreeMap<String, f64>, StockfolioError> {
    let mut weights = BTreeMap::new();
    for (symbol, &quantity) in portfolio.holdings() {
        let weight = prices.close(symbol)? * quantity / total;
        weights.insert(symbol.clone(), weight);
    }
    Ok(weights)
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSummary {
    pub date: NaiveDate,
    pub composition: String,
    pub value: f64,
    /// `None` when the portfolio is worth nothing on `date`.
    pub distribution: Option<BTreeMap<String, f64>>,
}

/// Composition, value and distribution in one pass.
pub fn summarize(
    portfolio: &Portfolio,
    market: &dyn MarketDataPort,
    config: &ValuationConfig,
    date: NaiveDate,
) -> Result<PortfolioSummary, StockfolioError> {
    let mut prices = PriceBook::new(market, date, config.fallback_days);
    let value = value_with(portfolio, &mut prices, config.mode)?;
    let distribution = if value.abs() < f64::EPSILON {
        None
    } else {
        Some(weights_with(portfolio, &mut prices, value)?)
    };
    Ok(PortfolioSummary {
        date,
        composition: portfolio.composition(),
        value,
        distribution,
    })
}

impl fmt::Display for PortfolioSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Composition:")?;
        write!(f, "{}", self.composition)?;
        writeln!(f, "Value on {}: {:.2}", self.date, self.value)?;
        writeln!(f, "Distribution:")?;
        match &self.distribution {
            Some(weights) => {
                for (symbol, weight) in weights {
                    writeln!(f, "  {}: {:.2}%", symbol, weight * 100.0)?;
                }
            }
            None => writeln!(f, "  (portfolio has no value on this date)")?,
        }
        Ok(())
    }
}

//! Portfolio holdings and their backing ledger.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt::Write;

use super::error::StockfolioError;
use super::ledger::{Ledger, QUANTITY_EPSILON};
use super::transaction::Transaction;
use crate::ports::market_data_port::MarketDataPort;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Portfolio {
    holdings: BTreeMap<String, f64>,
    ledger: Ledger,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded holdings with an empty ledger.
    pub fn with_holdings(holdings: BTreeMap<String, f64>) -> Self {
        Portfolio {
            holdings,
            ledger: Ledger::new(),
        }
    }

    pub fn from_parts(holdings: BTreeMap<String, f64>, ledger: Ledger) -> Self {
        Portfolio { holdings, ledger }
    }

    pub fn holdings(&self) -> &BTreeMap<String, f64> {
        &self.holdings
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn quantity(&self, symbol: &str) -> Option<f64> {
        self.holdings.get(symbol).copied()
    }

    pub fn has_holding(&self, symbol: &str) -> bool {
        self.holdings.contains_key(symbol)
    }

    /// Buys `quantity` of `symbol` on `date`. The symbol must be known to the
    /// market and have a bar on exactly that date.
    pub fn add_stock(
        &mut self,
        market: &dyn MarketDataPort,
        symbol: &str,
        date: NaiveDate,
        quantity: f64,
    ) -> Result<(), StockfolioError> {
        check_quantity(quantity)?;
        if !market.is_valid_symbol(symbol) {
            return Err(StockfolioError::InvalidInstrument {
                symbol: symbol.to_string(),
            });
        }
        if market.fetch_bar(symbol, date)?.is_none() {
            return Err(StockfolioError::NoPriceData {
                symbol: symbol.to_string(),
                date,
            });
        }
        self.record_purchase(symbol, date, quantity);
        Ok(())
    }

    /// Sells `quantity` of `symbol` on `date`, drawing down the oldest
    /// purchase lots first and recording the sale.
    pub fn remove_stock(
        &mut self,
        symbol: &str,
        date: NaiveDate,
        quantity: f64,
    ) -> Result<(), StockfolioError> {
        check_quantity(quantity)?;
        let held = self
            .quantity(symbol)
            .ok_or_else(|| StockfolioError::NoSuchHolding {
                symbol: symbol.to_string(),
            })?;

        self.ledger.consume(symbol, quantity, date)?;

        let left = held - quantity;
        if left > QUANTITY_EPSILON {
            self.holdings.insert(symbol.to_string(), left);
        } else {
            self.holdings.remove(symbol);
        }
        self.ledger.record(Transaction::sell(symbol, quantity, date));
        Ok(())
    }

    pub(crate) fn record_purchase(&mut self, symbol: &str, date: NaiveDate, quantity: f64) {
        *self.holdings.entry(symbol.to_string()).or_insert(0.0) += quantity;
        self.ledger.record(Transaction::buy(symbol, quantity, date));
    }

    /// Each holding followed by its ledger entries, one per line.
    pub fn composition(&self) -> String {
        let mut out = String::new();
        for (symbol, quantity) in &self.holdings {
            let _ = writeln!(out, "{symbol}: {quantity}");
            for tx in self.ledger.for_symbol(symbol) {
                let _ = writeln!(out, "\t{tx}");
            }
        }
        out
    }
}

fn check_quantity(quantity: f64) -> Result<(), StockfolioError> {
    if quantity.is_finite() && quantity > 0.0 {
        Ok(())
    } else {
        Err(StockfolioError::InvalidParameter {
            reason: format!("quantity must be positive, got {quantity}"),
        })
    }
}

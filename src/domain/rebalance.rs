//! Rebalancing holdings to target weight percentages.
//!
//! Every adjustment is sized against the value before rebalancing and priced
//! independently, so processing order does not matter. The batch is applied
//! to a working copy and committed only if every step succeeds.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::error::StockfolioError;
use super::ledger::QUANTITY_EPSILON;
use super::portfolio::Portfolio;
use super::pricing::close_price;
use super::transaction::TransactionKind;
use super::valuation::{portfolio_value, ValuationConfig};
use crate::ports::market_data_port::MarketDataPort;

#[derive(Debug, Clone, PartialEq)]
pub struct Adjustment {
    pub symbol: String,
    pub kind: TransactionKind,
    pub quantity: f64,
    pub price: f64,
    pub target_value: f64,
}

pub fn check_weights(weights: &BTreeMap<String, i64>) -> Result<(), StockfolioError> {
    if let Some((symbol, pct)) = weights.iter().find(|(_, pct)| **pct < 0) {
        return Err(StockfolioError::InvalidParameter {
            reason: format!("weight for {symbol} must not be negative, got {pct}"),
        });
    }
    let total: i64 = weights.values().sum();
    if total != 100 {
        return Err(StockfolioError::InvalidWeights { total });
    }
    Ok(())
}

/// Works out the trades that bring each weighted holding to its target
/// share of the current portfolio value, without touching the portfolio.
pub fn plan(
    portfolio: &Portfolio,
    market: &dyn MarketDataPort,
    config: &ValuationConfig,
    weights: &BTreeMap<String, i64>,
    date: NaiveDate,
) -> Result<Vec<Adjustment>, StockfolioError> {
    check_weights(weights)?;
    let total_value = portfolio_value(portfolio, market, config, date)?;

    let mut adjustments = Vec::with_capacity(weights.len());
    for (symbol, &pct) in weights {
        let held = portfolio
            .quantity(symbol)
            .ok_or_else(|| StockfolioError::NoSuchHolding {
                symbol: symbol.clone(),
            })?;
        let price = close_price(market, symbol, date, config.fallback_days)?;

        let target_value = total_value * pct as f64 / 100.0;
        let delta = target_value - price * held;
        let quantity = delta.abs() / price;
        if quantity <= QUANTITY_EPSILON {
            continue;
        }

        let kind = if delta > 0.0 {
            TransactionKind::Buy
        } else {
            TransactionKind::Sell
        };
        if kind == TransactionKind::Sell && quantity > held + QUANTITY_EPSILON {
            return Err(StockfolioError::InsufficientQuantity {
                symbol: symbol.clone(),
                requested: quantity,
                available: held,
            });
        }

        adjustments.push(Adjustment {
            symbol: symbol.clone(),
            kind,
            quantity: if kind == TransactionKind::Sell {
                quantity.min(held)
            } else {
                quantity
            },
            price,
            target_value,
        });
    }
    Ok(adjustments)
}

/// Plans and applies a rebalance on `date`. On error the portfolio is left
/// exactly as it was.
pub fn rebalance(
    portfolio: &mut Portfolio,
    market: &dyn MarketDataPort,
    config: &ValuationConfig,
    weights: &BTreeMap<String, i64>,
    date: NaiveDate,
) -> Result<Vec<Adjustment>, StockfolioError> {
    let adjustments = plan(portfolio, market, config, weights, date)?;

    let mut working = portfolio.clone();
    for adj in &adjustments {
        match adj.kind {
            TransactionKind::Buy => working.record_purchase(&adj.symbol, date, adj.quantity),
            TransactionKind::Sell => working.remove_stock(&adj.symbol, date, adj.quantity)?,
        }
    }
    *portfolio = working;
    Ok(adjustments)
}

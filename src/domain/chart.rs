//! Calendar-aware ASCII bar chart of portfolio value.
//!
//! Bucket size comes from the span of the range. The bar scale is the power
//! of ten one below the largest period-end value, so the tallest bar has
//! between 10 and 100 stars. Non-trading days reuse the last trading-day
//! value instead of drawing a misleading drop.

use chrono::NaiveDate;
use std::fmt;

use super::calendar::is_trading_day;
use super::error::StockfolioError;
use super::period::Granularity;
use super::portfolio::Portfolio;
use super::valuation::{portfolio_value, ValuationConfig};
use crate::ports::market_data_port::MarketDataPort;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartRow {
    pub date: NaiveDate,
    pub value: f64,
    pub stars: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub granularity: Granularity,
    pub scale: u64,
    pub rows: Vec<ChartRow>,
}

pub fn chart(
    portfolio: &Portfolio,
    market: &dyn MarketDataPort,
    config: &ValuationConfig,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Chart, StockfolioError> {
    let granularity = Granularity::for_span(start, end)?;
    let scale = scale_for(portfolio, market, config, granularity, start, end)?;

    let mut rows = Vec::new();
    let mut last_value: Option<f64> = None;
    let mut cursor = start;

    while cursor <= end {
        let trading = is_trading_day(cursor);
        let value = match last_value {
            Some(v) if !trading => v,
            _ => portfolio_value(portfolio, market, config, cursor)?,
        };
        if trading {
            last_value = Some(value);
        }
        rows.push(ChartRow {
            date: cursor,
            value,
            stars: stars_for(value, scale),
        });

        match granularity.advance(cursor) {
            Some(next) => cursor = next,
            None => break,
        }
    }

    Ok(Chart {
        start,
        end,
        granularity,
        scale,
        rows,
    })
}

/// Largest value over the trading-day period ends of the walk, turned into
/// a star scale.
fn scale_for(
    portfolio: &Portfolio,
    market: &dyn MarketDataPort,
    config: &ValuationConfig,
    granularity: Granularity,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<u64, StockfolioError> {
    let mut largest = 0.0_f64;
    let mut cursor = granularity.walk_start(start);

    while cursor <= end {
        let period_end = granularity.period_end(cursor).min(end);
        if let Some(day) = last_trading_day(cursor, period_end) {
            largest = largest.max(portfolio_value(portfolio, market, config, day)?);
        }
        match granularity.advance(cursor) {
            Some(next) => cursor = next,
            None => break,
        }
    }

    Ok(scale_from_max(largest))
}

/// Latest trading day in `[from, to]`.
fn last_trading_day(from: NaiveDate, to: NaiveDate) -> Option<NaiveDate> {
    let mut day = to;
    while day >= from {
        if is_trading_day(day) {
            return Some(day);
        }
        day = day.pred_opt()?;
    }
    None
}

/// `10^(floor(log10(max)) - 1)`, never below 1.
pub fn scale_from_max(max: f64) -> u64 {
    if !max.is_finite() || max <= 0.0 {
        return 1;
    }
    let power = max.log10().floor() as i64 - 1;
    if power <= 0 {
        return 1;
    }
    10u64.checked_pow(power as u32).unwrap_or(u64::MAX)
}

fn stars_for(value: f64, scale: u64) -> usize {
    let stars = (value / scale as f64).round();
    if stars.is_finite() && stars > 0.0 {
        stars as usize
    } else {
        0
    }
}

impl fmt::Display for Chart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Performance of portfolio from {} to {}", self.start, self.end)?;
        writeln!(f)?;
        for row in &self.rows {
            writeln!(f, "{}: {}", row.date, "*".repeat(row.stars))?;
        }
        writeln!(f)?;
        write!(f, "Scale: * = {} units", self.scale)
    }
}

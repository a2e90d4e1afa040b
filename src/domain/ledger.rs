//! Per-portfolio transaction ledger with oldest-first lot consumption.
//!
//! BUY records double as purchase lots: selling draws their quantity down,
//! earliest purchase date first, and lots driven to zero are pruned. The
//! sale itself is appended as a separate SELL record by the caller.

use chrono::NaiveDate;

use super::error::StockfolioError;
use super::transaction::{Transaction, TransactionKind};

/// Quantities at or below this are treated as exhausted.
pub const QUANTITY_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    entries: Vec<Transaction>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_transactions(entries: Vec<Transaction>) -> Self {
        Ledger { entries }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn record(&mut self, transaction: Transaction) {
        self.entries.push(transaction);
    }

    pub fn for_symbol<'a>(&'a self, symbol: &'a str) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.entries.iter().filter(move |t| t.symbol == symbol)
    }

    /// Sum of the remaining quantity across all BUY lots of `symbol`.
    pub fn open_lot_quantity(&self, symbol: &str) -> f64 {
        self.for_symbol(symbol)
            .filter(|t| t.is_buy())
            .map(|t| t.quantity)
            .sum()
    }

    /// Draws `quantity` of `symbol` from BUY lots, earliest purchase date
    /// first, as of `date`. Nothing is modified unless the full quantity can
    /// be drawn.
    pub fn consume(
        &mut self,
        symbol: &str,
        quantity: f64,
        date: NaiveDate,
    ) -> Result<(), StockfolioError> {
        let mut lots: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, t)| t.kind == TransactionKind::Buy && t.symbol == symbol)
            .map(|(i, _)| i)
            .collect();
        lots.sort_by_key(|&i| self.entries[i].date);

        let mut remaining = quantity;
        let mut draws: Vec<(usize, f64)> = Vec::with_capacity(lots.len());

        for i in lots {
            if remaining <= QUANTITY_EPSILON {
                break;
            }
            let lot = &self.entries[i];
            if date < lot.date {
                return Err(StockfolioError::InvalidRemovalDate {
                    symbol: symbol.to_string(),
                    date,
                    purchase_date: lot.date,
                });
            }
            let take = lot.quantity.min(remaining);
            draws.push((i, take));
            remaining -= take;
        }

        if remaining > QUANTITY_EPSILON {
            return Err(StockfolioError::InsufficientQuantity {
                symbol: symbol.to_string(),
                requested: quantity,
                available: quantity - remaining,
            });
        }

        for (i, take) in draws {
            self.entries[i].quantity -= take;
        }
        self.prune();
        Ok(())
    }

    fn prune(&mut self) {
        self.entries.retain(|t| t.quantity > QUANTITY_EPSILON);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample_ledger() -> Ledger {
        // Inserted out of date order on purpose.
        Ledger::from_transactions(vec![
            Transaction::buy("AAPL", 5.0, d(2024, 6, 12)),
            Transaction::buy("AAPL", 10.0, d(2024, 6, 10)),
            Transaction::buy("IBM", 3.0, d(2024, 6, 10)),
        ])
    }

    #[test]
    fn consumes_earliest_lot_first() {
        let mut ledger = sample_ledger();
        ledger.consume("AAPL", 4.0, d(2024, 6, 20)).unwrap();

        let aapl: Vec<_> = ledger.for_symbol("AAPL").collect();
        assert_eq!(aapl.len(), 2);
        assert_relative_eq!(aapl[0].quantity, 5.0);
        assert_relative_eq!(aapl[1].quantity, 6.0);
        assert_eq!(aapl[1].date, d(2024, 6, 10));
    }

    #[test]
    fn exhausted_lots_are_pruned() {
        let mut ledger = sample_ledger();
        ledger.consume("AAPL", 12.0, d(2024, 6, 20)).unwrap();

        let aapl: Vec<_> = ledger.for_symbol("AAPL").collect();
        assert_eq!(aapl.len(), 1);
        assert_eq!(aapl[0].date, d(2024, 6, 12));
        assert_relative_eq!(aapl[0].quantity, 3.0);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn sale_before_needed_purchase_fails() {
        let mut ledger = sample_ledger();
        let err = ledger.consume("AAPL", 12.0, d(2024, 6, 11)).unwrap_err();
        assert!(matches!(
            err,
            StockfolioError::InvalidRemovalDate { purchase_date, .. } if purchase_date == d(2024, 6, 12)
        ));
        // Unchanged on failure.
        assert_eq!(ledger, sample_ledger());
    }

    #[test]
    fn later_lot_not_checked_once_satisfied() {
        let mut ledger = sample_ledger();
        ledger.consume("AAPL", 10.0, d(2024, 6, 11)).unwrap();
        assert_relative_eq!(ledger.open_lot_quantity("AAPL"), 5.0);
    }

    #[test]
    fn insufficient_lots_fail_without_mutation() {
        let mut ledger = sample_ledger();
        let err = ledger.consume("AAPL", 16.0, d(2024, 6, 20)).unwrap_err();
        match err {
            StockfolioError::InsufficientQuantity {
                requested,
                available,
                ..
            } => {
                assert_relative_eq!(requested, 16.0);
                assert_relative_eq!(available, 15.0);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(ledger, sample_ledger());
    }

    #[test]
    fn sell_records_are_not_lots() {
        let mut ledger = sample_ledger();
        ledger.record(Transaction::sell("IBM", 1.0, d(2024, 6, 11)));
        assert_relative_eq!(ledger.open_lot_quantity("IBM"), 3.0);
        assert!(ledger.consume("IBM", 3.5, d(2024, 6, 20)).is_err());
    }
}

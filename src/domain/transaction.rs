//! Ledger transaction records.

use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

use super::error::StockfolioError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Buy,
    Sell,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Buy => f.write_str("buy"),
            TransactionKind::Sell => f.write_str("sell"),
        }
    }
}

impl FromStr for TransactionKind {
    type Err = StockfolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(TransactionKind::Buy),
            "sell" => Ok(TransactionKind::Sell),
            other => Err(StockfolioError::InvalidParameter {
                reason: format!("unknown transaction kind '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub kind: TransactionKind,
    pub symbol: String,
    pub quantity: f64,
    pub date: NaiveDate,
}

impl Transaction {
    pub fn buy(symbol: &str, quantity: f64, date: NaiveDate) -> Self {
        Transaction {
            kind: TransactionKind::Buy,
            symbol: symbol.to_string(),
            quantity,
            date,
        }
    }

    pub fn sell(symbol: &str, quantity: f64, date: NaiveDate) -> Self {
        Transaction {
            kind: TransactionKind::Sell,
            symbol: symbol.to_string(),
            quantity,
            date,
        }
    }

    pub fn is_buy(&self) -> bool {
        self.kind == TransactionKind::Buy
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.date, self.quantity, self.kind)
    }
}

//! CSV file portfolio store.
//!
//! Each portfolio `<name>` lives in two files under the base directory:
//! `<name>_holdings.csv` (`symbol,quantity`) and `<name>_ledger.csv`
//! (`kind,symbol,quantity,date`).

use crate::domain::error::StockfolioError;
use crate::domain::ledger::Ledger;
use crate::domain::portfolio::Portfolio;
use crate::domain::transaction::{Transaction, TransactionKind};
use crate::ports::portfolio_store_port::PortfolioStorePort;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const HOLDINGS_SUFFIX: &str = "_holdings.csv";
const LEDGER_SUFFIX: &str = "_ledger.csv";

pub struct CsvPortfolioStore {
    base_path: PathBuf,
}

impl CsvPortfolioStore {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn paths(&self, name: &str) -> Result<(PathBuf, PathBuf), StockfolioError> {
        let usable = !name.is_empty()
            && !name.starts_with('.')
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !usable {
            return Err(StockfolioError::InvalidParameter {
                reason: format!("portfolio name '{}' cannot be stored", name),
            });
        }
        Ok((
            self.base_path.join(format!("{}{}", name, HOLDINGS_SUFFIX)),
            self.base_path.join(format!("{}{}", name, LEDGER_SUFFIX)),
        ))
    }
}

fn storage_err(path: &Path, e: impl std::fmt::Display) -> StockfolioError {
    StockfolioError::Storage {
        reason: format!("{}: {}", path.display(), e),
    }
}

fn read_holdings(path: &Path) -> Result<BTreeMap<String, f64>, StockfolioError> {
    let mut rdr = csv::Reader::from_path(path).map_err(|e| storage_err(path, e))?;
    let mut holdings = BTreeMap::new();

    for result in rdr.records() {
        let record = result.map_err(|e| storage_err(path, e))?;
        let symbol = record.get(0).unwrap_or("").trim();
        if symbol.is_empty() {
            return Err(storage_err(path, "holding without a symbol"));
        }
        let quantity: f64 = record
            .get(1)
            .unwrap_or("")
            .trim()
            .parse()
            .map_err(|e| storage_err(path, format!("bad quantity for {}: {}", symbol, e)))?;
        holdings.insert(symbol.to_string(), quantity);
    }
    Ok(holdings)
}

fn read_ledger(path: &Path) -> Result<Ledger, StockfolioError> {
    if !path.exists() {
        return Ok(Ledger::new());
    }
    let mut rdr = csv::Reader::from_path(path).map_err(|e| storage_err(path, e))?;
    let mut entries = Vec::new();

    for (row, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| storage_err(path, e))?;
        let field = |i: usize| record.get(i).unwrap_or("").trim();
        let bad_row = |what: &str| storage_err(path, format!("row {}: {}", row + 2, what));

        let kind: TransactionKind = field(0).parse().map_err(|_| bad_row("bad kind"))?;
        let symbol = field(1);
        if symbol.is_empty() {
            return Err(bad_row("missing symbol"));
        }
        let quantity: f64 = field(2).parse().map_err(|_| bad_row("bad quantity"))?;
        let date = NaiveDate::parse_from_str(field(3), "%Y-%m-%d")
            .map_err(|_| bad_row("bad date"))?;

        entries.push(Transaction {
            kind,
            symbol: symbol.to_string(),
            quantity,
            date,
        });
    }
    Ok(Ledger::from_transactions(entries))
}

impl PortfolioStorePort for CsvPortfolioStore {
    fn load(&self, name: &str) -> Result<Option<Portfolio>, StockfolioError> {
        let (holdings_path, ledger_path) = self.paths(name)?;
        if !holdings_path.exists() {
            return Ok(None);
        }
        let holdings = read_holdings(&holdings_path)?;
        let ledger = read_ledger(&ledger_path)?;
        tracing::debug!(portfolio = name, holdings = holdings.len(), records = ledger.len(), "loaded portfolio");
        Ok(Some(Portfolio::from_parts(holdings, ledger)))
    }

    fn save(&self, name: &str, portfolio: &Portfolio) -> Result<(), StockfolioError> {
        let (holdings_path, ledger_path) = self.paths(name)?;
        fs::create_dir_all(&self.base_path).map_err(|e| storage_err(&self.base_path, e))?;

        let mut wtr = csv::Writer::from_path(&holdings_path).map_err(|e| storage_err(&holdings_path, e))?;
        wtr.write_record(["symbol", "quantity"])
            .map_err(|e| storage_err(&holdings_path, e))?;
        for (symbol, quantity) in portfolio.holdings() {
            wtr.write_record([symbol.as_str(), quantity.to_string().as_str()])
                .map_err(|e| storage_err(&holdings_path, e))?;
        }
        wtr.flush().map_err(|e| storage_err(&holdings_path, e))?;

        let mut wtr = csv::Writer::from_path(&ledger_path).map_err(|e| storage_err(&ledger_path, e))?;
        wtr.write_record(["kind", "symbol", "quantity", "date"])
            .map_err(|e| storage_err(&ledger_path, e))?;
        for t in portfolio.ledger().transactions() {
            wtr.write_record([
                t.kind.to_string(),
                t.symbol.clone(),
                t.quantity.to_string(),
                t.date.format("%Y-%m-%d").to_string(),
            ])
            .map_err(|e| storage_err(&ledger_path, e))?;
        }
        wtr.flush().map_err(|e| storage_err(&ledger_path, e))?;

        tracing::info!(portfolio = name, records = portfolio.ledger().len(), "saved portfolio");
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>, StockfolioError> {
        let entries = match fs::read_dir(&self.base_path) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(storage_err(&self.base_path, e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| storage_err(&self.base_path, e))?;
            let file_name = entry.file_name();
            if let Some(name) = file_name.to_str().and_then(|f| f.strip_suffix(HOLDINGS_SUFFIX)) {
                if !name.is_empty() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

//! Named portfolio registry.

use std::collections::BTreeMap;

use super::error::StockfolioError;
use super::portfolio::Portfolio;
use crate::ports::portfolio_store_port::PortfolioStorePort;

#[derive(Debug, Clone, Default)]
pub struct PortfolioRegistry {
    portfolios: BTreeMap<String, Portfolio>,
}

impl PortfolioRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every portfolio the store knows about.
    pub fn load_all(store: &dyn PortfolioStorePort) -> Result<Self, StockfolioError> {
        let mut registry = Self::new();
        for name in store.list()? {
            if let Some(portfolio) = store.load(&name)? {
                registry.portfolios.insert(name, portfolio);
            }
        }
        Ok(registry)
    }

    pub fn save(&self, store: &dyn PortfolioStorePort, name: &str) -> Result<(), StockfolioError> {
        store.save(name, self.get(name)?)
    }

    /// Registers a new portfolio seeded with `holdings`.
    pub fn create(
        &mut self,
        name: &str,
        holdings: BTreeMap<String, f64>,
    ) -> Result<&mut Portfolio, StockfolioError> {
        self.insert(name, Portfolio::with_holdings(holdings))
    }

    pub fn insert(
        &mut self,
        name: &str,
        portfolio: Portfolio,
    ) -> Result<&mut Portfolio, StockfolioError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StockfolioError::InvalidParameter {
                reason: "portfolio name must not be empty".into(),
            });
        }
        if self.portfolios.contains_key(name) {
            return Err(StockfolioError::DuplicatePortfolio {
                name: name.to_string(),
            });
        }
        Ok(self.portfolios.entry(name.to_string()).or_insert(portfolio))
    }

    pub fn get(&self, name: &str) -> Result<&Portfolio, StockfolioError> {
        self.portfolios
            .get(name)
            .ok_or_else(|| StockfolioError::NoSuchPortfolio {
                name: name.to_string(),
            })
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut Portfolio, StockfolioError> {
        self.portfolios
            .get_mut(name)
            .ok_or_else(|| StockfolioError::NoSuchPortfolio {
                name: name.to_string(),
            })
    }

    pub fn names(&self) -> Vec<String> {
        self.portfolios.keys().cloned().collect()
    }
}

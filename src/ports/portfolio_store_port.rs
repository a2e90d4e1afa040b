//! Portfolio persistence port trait.

use crate::domain::error::StockfolioError;
use crate::domain::portfolio::Portfolio;

pub trait PortfolioStorePort {
    fn load(&self, name: &str) -> Result<Option<Portfolio>, StockfolioError>;

    fn save(&self, name: &str, portfolio: &Portfolio) -> Result<(), StockfolioError>;

    /// Names of all saved portfolios, sorted.
    fn list(&self) -> Result<Vec<String>, StockfolioError>;
}

//! Configuration access port trait.

use crate::domain::error::StockfolioError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;

    /// Trimmed, non-empty value or `ConfigMissing`.
    fn require_string(&self, section: &str, key: &str) -> Result<String, StockfolioError> {
        self.get_string(section, key)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| StockfolioError::ConfigMissing {
                section: section.to_string(),
                key: key.to_string(),
            })
    }
}

//! Configuration validation.
//!
//! Checks every setting before any portfolio is loaded.

use crate::domain::error::StockfolioError;
use crate::domain::valuation::ValuationMode;
use crate::ports::config_port::ConfigPort;

/// Upper bound for `[valuation] fallback_days`.
pub const MAX_FALLBACK_DAYS: i64 = 31;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), StockfolioError> {
    validate_directory(config, "data")?;
    validate_directory(config, "portfolios")?;
    validate_valuation_mode(config)?;
    validate_fallback_days(config)?;
    Ok(())
}

fn validate_directory(config: &dyn ConfigPort, section: &str) -> Result<(), StockfolioError> {
    match config.get_string(section, "directory") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        Some(_) => Err(StockfolioError::ConfigInvalid {
            section: section.to_string(),
            key: "directory".to_string(),
            reason: "directory must not be empty".to_string(),
        }),
        None => Err(StockfolioError::ConfigMissing {
            section: section.to_string(),
            key: "directory".to_string(),
        }),
    }
}

fn validate_valuation_mode(config: &dyn ConfigPort) -> Result<(), StockfolioError> {
    match config.get_string("valuation", "mode") {
        None => Ok(()),
        Some(s) if ValuationMode::parse(&s).is_some() => Ok(()),
        Some(s) => Err(StockfolioError::ConfigInvalid {
            section: "valuation".to_string(),
            key: "mode".to_string(),
            reason: format!("unknown mode '{s}', expected held_lots or ledger_parity"),
        }),
    }
}

fn validate_fallback_days(config: &dyn ConfigPort) -> Result<(), StockfolioError> {
    let Some(raw) = config.get_string("valuation", "fallback_days") else {
        return Ok(());
    };
    match raw.trim().parse::<i64>() {
        Ok(days) if (0..=MAX_FALLBACK_DAYS).contains(&days) => Ok(()),
        _ => Err(StockfolioError::ConfigInvalid {
            section: "valuation".to_string(),
            key: "fallback_days".to_string(),
            reason: format!("fallback_days must be an integer between 0 and {MAX_FALLBACK_DAYS}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    const VALID: &str = "[data]\ndirectory = prices\n\n[portfolios]\ndirectory = saved\n";

    fn with_valuation(extra: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(&format!("{VALID}\n[valuation]\n{extra}\n")).unwrap()
    }

    #[test]
    fn minimal_config_is_valid() {
        let config = FileConfigAdapter::from_string(VALID).unwrap();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn missing_data_directory() {
        let config = FileConfigAdapter::from_string("[portfolios]\ndirectory = saved\n").unwrap();
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(
            err,
            StockfolioError::ConfigMissing { ref section, .. } if section == "data"
        ));
    }

    #[test]
    fn blank_portfolio_directory() {
        let config =
            FileConfigAdapter::from_string("[data]\ndirectory = prices\n[portfolios]\ndirectory =\n")
                .unwrap();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn valuation_mode_checked() {
        assert!(validate_config(&with_valuation("mode = ledger_parity")).is_ok());
        let err = validate_config(&with_valuation("mode = signed")).unwrap_err();
        assert!(matches!(err, StockfolioError::ConfigInvalid { ref key, .. } if key == "mode"));
    }

    #[test]
    fn fallback_days_bounds() {
        assert!(validate_config(&with_valuation("fallback_days = 0")).is_ok());
        assert!(validate_config(&with_valuation("fallback_days = 31")).is_ok());
        assert!(validate_config(&with_valuation("fallback_days = 32")).is_err());
        assert!(validate_config(&with_valuation("fallback_days = -1")).is_err());
        assert!(validate_config(&with_valuation("fallback_days = week")).is_err());
    }
}

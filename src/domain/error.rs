//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for stockfolio.
#[derive(Debug, thiserror::Error)]
pub enum StockfolioError {
    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    #[error("no holding of {symbol} in this portfolio")]
    NoSuchHolding { symbol: String },

    #[error("cannot remove {symbol} on {date}: it precedes the purchase on {purchase_date}")]
    InvalidRemovalDate {
        symbol: String,
        date: NaiveDate,
        purchase_date: NaiveDate,
    },

    #[error("insufficient quantity of {symbol}: requested {requested}, available {available}")]
    InsufficientQuantity {
        symbol: String,
        requested: f64,
        available: f64,
    },

    #[error("weights must sum to 100, got {total}")]
    InvalidWeights { total: i64 },

    #[error("no price data for {symbol} near {date}")]
    NoPriceData { symbol: String, date: NaiveDate },

    #[error("no price data for {symbol} between {start} and {end}")]
    NoDataInRange {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("portfolio value is zero on {date}")]
    ZeroPortfolioValue { date: NaiveDate },

    #[error("invalid date range: {start} to {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("unknown instrument: {symbol}")]
    InvalidInstrument { symbol: String },

    #[error("no portfolio named {name}")]
    NoSuchPortfolio { name: String },

    #[error("a portfolio named {name} already exists")]
    DuplicatePortfolio { name: String },

    #[error("market data error: {reason}")]
    MarketData { reason: String },

    #[error("storage error: {reason}")]
    Storage { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&StockfolioError> for std::process::ExitCode {
    fn from(err: &StockfolioError) -> Self {
        let code: u8 = match err {
            StockfolioError::Io(_) | StockfolioError::Storage { .. } => 1,
            StockfolioError::ConfigParse { .. }
            | StockfolioError::ConfigMissing { .. }
            | StockfolioError::ConfigInvalid { .. } => 2,
            StockfolioError::MarketData { .. }
            | StockfolioError::NoPriceData { .. }
            | StockfolioError::NoDataInRange { .. } => 3,
            StockfolioError::InvalidParameter { .. }
            | StockfolioError::InvalidWeights { .. }
            | StockfolioError::InvalidDateRange { .. }
            | StockfolioError::InvalidInstrument { .. }
            | StockfolioError::NoSuchPortfolio { .. }
            | StockfolioError::DuplicatePortfolio { .. } => 4,
            StockfolioError::NoSuchHolding { .. }
            | StockfolioError::InvalidRemovalDate { .. }
            | StockfolioError::InsufficientQuantity { .. }
            | StockfolioError::ZeroPortfolioValue { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_market_adapter::CsvMarketAdapter;
use crate::adapters::csv_portfolio_store::CsvPortfolioStore;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::calendar::is_trading_day;
use crate::domain::chart::chart;
use crate::domain::config_validation::validate_config;
use crate::domain::error::StockfolioError;
use crate::domain::indicator::{crossovers, moving_average, price_change};
use crate::domain::pricing::DEFAULT_FALLBACK_DAYS;
use crate::domain::rebalance::{self, Adjustment};
use crate::domain::registry::PortfolioRegistry;
use crate::domain::valuation::{self, ValuationConfig, ValuationMode};
use crate::ports::config_port::ConfigPort;

#[derive(Parser, Debug)]
#[command(name = "stockfolio", about = "Stock portfolio valuation and rebalancing")]
pub struct Cli {
    /// INI configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a portfolio, optionally seeded with holdings (SYMBOL=QTY)
    Create {
        #[arg(short, long)]
        name: String,
        #[arg(long = "holding", value_parser = parse_holding)]
        holdings: Vec<(String, f64)>,
    },
    /// List saved portfolios
    List,
    /// Buy shares on a date
    Buy {
        #[arg(short, long)]
        portfolio: String,
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long)]
        quantity: f64,
        #[arg(short, long, value_parser = parse_date)]
        date: NaiveDate,
    },
    /// Sell shares on a date, oldest lots first
    Sell {
        #[arg(short, long)]
        portfolio: String,
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long)]
        quantity: f64,
        #[arg(short, long, value_parser = parse_date)]
        date: NaiveDate,
    },
    /// Composition, value and distribution on a date
    Show {
        #[arg(short, long)]
        portfolio: String,
        #[arg(short, long, value_parser = parse_date)]
        date: NaiveDate,
    },
    /// Portfolio value on a date
    Value {
        #[arg(short, long)]
        portfolio: String,
        #[arg(short, long, value_parser = parse_date)]
        date: NaiveDate,
    },
    /// Share of value held in each instrument
    Distribution {
        #[arg(short, long)]
        portfolio: String,
        #[arg(short, long, value_parser = parse_date)]
        date: NaiveDate,
    },
    /// Trade towards integer percentage weights, e.g. AAPL=25,IBM=75
    Rebalance {
        #[arg(short, long)]
        portfolio: String,
        #[arg(short, long, value_parser = parse_date)]
        date: NaiveDate,
        #[arg(short, long)]
        weights: String,
        /// Print the trades without applying them
        #[arg(long)]
        dry_run: bool,
    },
    /// Calendar-window moving average of closes
    MovingAverage {
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long, value_parser = parse_date)]
        date: NaiveDate,
        #[arg(short, long)]
        window: i64,
    },
    /// Dates where the close crosses its moving average
    Crossovers {
        #[arg(short, long)]
        symbol: String,
        #[arg(long, value_parser = parse_date)]
        start: NaiveDate,
        #[arg(long, value_parser = parse_date)]
        end: NaiveDate,
        #[arg(short, long)]
        window: i64,
    },
    /// Close-to-close gain or loss of one instrument
    Gain {
        #[arg(short, long)]
        symbol: String,
        #[arg(long, value_parser = parse_date)]
        start: NaiveDate,
        #[arg(long, value_parser = parse_date)]
        end: NaiveDate,
    },
    /// ASCII chart of portfolio value
    Chart {
        #[arg(short, long)]
        portfolio: String,
        #[arg(long, value_parser = parse_date)]
        start: NaiveDate,
        #[arg(long, value_parser = parse_date)]
        end: NaiveDate,
    },
    /// Whether the market trades on a date
    TradingDay {
        #[arg(short, long, value_parser = parse_date)]
        date: NaiveDate,
    },
}

/// Settings resolved from the INI file.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub portfolio_dir: PathBuf,
    pub valuation: ValuationConfig,
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(cli) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Runs one command and returns what it prints.
pub fn execute(cli: Cli) -> Result<String, StockfolioError> {
    if let Command::TradingDay { date } = cli.command {
        return Ok(trading_day_line(date));
    }

    let config_path = cli.config.ok_or_else(|| StockfolioError::ConfigMissing {
        section: "cli".into(),
        key: "--config".into(),
    })?;
    let adapter = FileConfigAdapter::from_file(&config_path)?;
    validate_config(&adapter)?;
    let base = config_path.parent().unwrap_or(Path::new("."));
    let settings = build_settings(&adapter, base)?;
    tracing::debug!(?settings, "resolved settings");

    let market = CsvMarketAdapter::new(settings.data_dir.clone());
    let store = CsvPortfolioStore::new(settings.portfolio_dir.clone());
    let valuation_config = settings.valuation;

    match cli.command {
        Command::Create { name, holdings } => {
            let mut seed = BTreeMap::new();
            for (symbol, quantity) in holdings {
                if seed.insert(symbol.clone(), quantity).is_some() {
                    return Err(StockfolioError::InvalidParameter {
                        reason: format!("{symbol} listed more than once"),
                    });
                }
            }
            let mut registry = PortfolioRegistry::load_all(&store)?;
            registry.create(&name, seed)?;
            registry.save(&store, name.trim())?;
            Ok(format!("Created portfolio {}\n", name.trim()))
        }
        Command::List => {
            let names = PortfolioRegistry::load_all(&store)?.names();
            if names.is_empty() {
                return Ok("No portfolios\n".to_string());
            }
            Ok(names.iter().map(|n| format!("{n}\n")).collect())
        }
        Command::Buy {
            portfolio,
            symbol,
            quantity,
            date,
        } => {
            let mut registry = PortfolioRegistry::load_all(&store)?;
            registry
                .get_mut(&portfolio)?
                .add_stock(&market, &symbol, date, quantity)?;
            registry.save(&store, &portfolio)?;
            Ok(format!("Bought {quantity} {symbol} on {date}\n"))
        }
        Command::Sell {
            portfolio,
            symbol,
            quantity,
            date,
        } => {
            let mut registry = PortfolioRegistry::load_all(&store)?;
            registry
                .get_mut(&portfolio)?
                .remove_stock(&symbol, date, quantity)?;
            registry.save(&store, &portfolio)?;
            Ok(format!("Sold {quantity} {symbol} on {date}\n"))
        }
        Command::Show { portfolio, date } => {
            let registry = PortfolioRegistry::load_all(&store)?;
            let summary = valuation::summarize(registry.get(&portfolio)?, &market, &valuation_config, date)?;
            Ok(format!("{summary}"))
        }
        Command::Value { portfolio, date } => {
            let registry = PortfolioRegistry::load_all(&store)?;
            let value =
                valuation::portfolio_value(registry.get(&portfolio)?, &market, &valuation_config, date)?;
            Ok(format!("Value of {portfolio} on {date}: {value:.2}\n"))
        }
        Command::Distribution { portfolio, date } => {
            let registry = PortfolioRegistry::load_all(&store)?;
            let weights =
                valuation::distribution(registry.get(&portfolio)?, &market, &valuation_config, date)?;
            let mut out = String::new();
            for (symbol, weight) in weights {
                let _ = writeln!(out, "{symbol}: {:.2}%", weight * 100.0);
            }
            Ok(out)
        }
        Command::Rebalance {
            portfolio,
            date,
            weights,
            dry_run,
        } => {
            let weights = parse_weights(&weights)?;
            let mut registry = PortfolioRegistry::load_all(&store)?;
            let adjustments = if dry_run {
                rebalance::plan(registry.get(&portfolio)?, &market, &valuation_config, &weights, date)?
            } else {
                let adjustments = rebalance::rebalance(
                    registry.get_mut(&portfolio)?,
                    &market,
                    &valuation_config,
                    &weights,
                    date,
                )?;
                registry.save(&store, &portfolio)?;
                tracing::info!(portfolio = %portfolio, trades = adjustments.len(), "rebalanced");
                adjustments
            };
            Ok(format_adjustments(&adjustments))
        }
        Command::MovingAverage {
            symbol,
            date,
            window,
        } => {
            let average = moving_average(&market, &symbol, date, window)?;
            Ok(format!("{window}-day moving average of {symbol} on {date}: {average:.4}\n"))
        }
        Command::Crossovers {
            symbol,
            start,
            end,
            window,
        } => {
            let dates = crossovers(&market, &symbol, start, end, window)?;
            if dates.is_empty() {
                return Ok(format!("No crossovers for {symbol} between {start} and {end}\n"));
            }
            Ok(dates.iter().map(|d| format!("{d}\n")).collect())
        }
        Command::Gain { symbol, start, end } => {
            let change = price_change(&market, &symbol, start, end, valuation_config.fallback_days)?;
            Ok(format!("{symbol} changed by {change:.2} from {start} to {end}\n"))
        }
        Command::Chart {
            portfolio,
            start,
            end,
        } => {
            let registry = PortfolioRegistry::load_all(&store)?;
            let chart = chart(registry.get(&portfolio)?, &market, &valuation_config, start, end)?;
            Ok(format!("{chart}\n"))
        }
        Command::TradingDay { date } => Ok(trading_day_line(date)),
    }
}

/// Reads directories and valuation options. Relative directories are taken
/// relative to `base`, normally the directory holding the INI file.
pub fn build_settings(config: &dyn ConfigPort, base: &Path) -> Result<Settings, StockfolioError> {
    let data_dir = base.join(config.require_string("data", "directory")?);
    let portfolio_dir = base.join(config.require_string("portfolios", "directory")?);

    let mode = match config.get_string("valuation", "mode") {
        Some(raw) => ValuationMode::parse(&raw).ok_or_else(|| StockfolioError::ConfigInvalid {
            section: "valuation".into(),
            key: "mode".into(),
            reason: format!("unknown mode '{raw}'"),
        })?,
        None => ValuationMode::default(),
    };
    let fallback_days = config.get_int("valuation", "fallback_days", DEFAULT_FALLBACK_DAYS.into());
    let fallback_days =
        u32::try_from(fallback_days).map_err(|_| StockfolioError::ConfigInvalid {
            section: "valuation".into(),
            key: "fallback_days".into(),
            reason: format!("{fallback_days} is not a day count"),
        })?;

    Ok(Settings {
        data_dir,
        portfolio_dir,
        valuation: ValuationConfig {
            mode,
            fallback_days,
        },
    })
}

/// Parses `AAPL=25,IBM=75` into integer percentages.
pub fn parse_weights(raw: &str) -> Result<BTreeMap<String, i64>, StockfolioError> {
    let mut weights = BTreeMap::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (symbol, pct) = part
            .split_once('=')
            .ok_or_else(|| StockfolioError::InvalidParameter {
                reason: format!("weight '{part}' is not SYMBOL=PERCENT"),
            })?;
        let symbol = symbol.trim();
        let pct: i64 = pct
            .trim()
            .parse()
            .map_err(|_| StockfolioError::InvalidParameter {
                reason: format!("weight for {symbol} must be a whole number"),
            })?;
        if symbol.is_empty() || weights.insert(symbol.to_string(), pct).is_some() {
            return Err(StockfolioError::InvalidParameter {
                reason: format!("weight '{part}' is empty or repeated"),
            });
        }
    }
    Ok(weights)
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{raw}' (expected YYYY-MM-DD)"))
}

fn parse_holding(raw: &str) -> Result<(String, f64), String> {
    let (symbol, quantity) = raw
        .split_once('=')
        .ok_or_else(|| format!("holding '{raw}' is not SYMBOL=QUANTITY"))?;
    let quantity: f64 = quantity
        .trim()
        .parse()
        .map_err(|_| format!("invalid quantity in '{raw}'"))?;
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(format!("quantity in '{raw}' must be positive"));
    }
    Ok((symbol.trim().to_string(), quantity))
}

fn format_adjustments(adjustments: &[Adjustment]) -> String {
    if adjustments.is_empty() {
        return "Already balanced\n".to_string();
    }
    let mut out = String::new();
    for adj in adjustments {
        let _ = writeln!(
            out,
            "{} {:.4} {} at {:.2} (target value {:.2})",
            adj.kind, adj.quantity, adj.symbol, adj.price, adj.target_value
        );
    }
    out
}

fn trading_day_line(date: NaiveDate) -> String {
    if is_trading_day(date) {
        format!("{date} is a trading day\n")
    } else {
        format!("{date} is not a trading day\n")
    }
}

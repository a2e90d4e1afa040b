//! Technical indicators over daily closes.
//!
//! - `sma`: calendar-window moving average
//! - `crossover`: dates where the close crosses its moving average
//! - `change`: close-to-close gain or loss between two dates

pub mod change;
pub mod crossover;
pub mod sma;

pub use change::price_change;
pub use crossover::crossovers;
pub use sma::moving_average;

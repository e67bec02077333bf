//! Technical indicator implementations.
//!
//! Every indicator takes an ordered slice of closing prices and returns
//! series of the same length, positionally aligned with the input: index
//! `i` of the output belongs to bar `i`. Positions before the lookback
//! window has filled hold a placeholder ([`WARMUP_PLACEHOLDER`] for
//! averages and bands, [`RSI_PLACEHOLDER`] for the oscillator). All
//! functions are pure and run in O(n).
//!
//! - `IndicatorType`: indicator identity + parameters, used for labels and
//!   warm-up bookkeeping

pub mod sma;
pub mod ema;
pub mod rsi;
pub mod macd;
pub mod stddev;
pub mod bollinger;

pub use bollinger::{calculate_bollinger, BollingerBands};
pub use ema::calculate_ema;
pub use macd::{calculate_macd, MacdSeries};
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use stddev::calculate_stddev;

use std::fmt;

/// Value held by averages, deviations and bands before their window fills.
pub const WARMUP_PLACEHOLDER: f64 = 0.0;

/// Neutral oscillator value held before the first full window of changes.
pub const RSI_PLACEHOLDER: f64 = 50.0;

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        multiplier: f64,
    },
}

impl IndicatorType {
    /// Number of bars that must precede the first bar on which the
    /// indicator may be traded.
    pub fn lookback(&self) -> usize {
        match self {
            IndicatorType::Sma(period)
            | IndicatorType::Ema(period)
            | IndicatorType::Rsi(period) => *period,
            IndicatorType::Macd { slow, signal, .. } => (slow + signal).saturating_sub(1),
            IndicatorType::Bollinger { period, .. } => *period,
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger { period, multiplier } => {
                write!(f, "BOLLINGER({},{})", period, multiplier)
            }
        }
    }
}

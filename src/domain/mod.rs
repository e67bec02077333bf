//! Core domain types and logic.
//!
//! Everything in here is pure: no I/O, no configuration parsing. The
//! engine consumes bars and a [`strategy::StrategyConfig`] and returns a
//! [`backtest::BacktestResult`].

pub mod ohlcv;
pub mod indicator;
pub mod strategy;
pub mod position;
pub mod execution;
pub mod backtest;
pub mod metrics;
pub mod comparison;
pub mod config_validation;
pub mod error;

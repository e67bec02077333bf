//! Strategy comparison.
//!
//! Runs a fixed set of crossover presets over the same bars and collects
//! one summary row per preset. Runs are independent and share only the
//! read-only bar slice, so they fan out across the rayon pool.

use rayon::prelude::*;
use tracing::info;

use super::backtest::run_backtest;
use super::metrics::Metrics;
use super::ohlcv::Bar;
use super::strategy::StrategyConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub short_period: usize,
    pub long_period: usize,
}

pub const PRESETS: [Preset; 4] = [
    Preset {
        name: "Aggressive",
        short_period: 10,
        long_period: 30,
    },
    Preset {
        name: "Medium-Fast",
        short_period: 20,
        long_period: 50,
    },
    Preset {
        name: "Golden Cross",
        short_period: 50,
        long_period: 200,
    },
    Preset {
        name: "Conservative",
        short_period: 100,
        long_period: 300,
    },
];

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub name: String,
    pub short_period: usize,
    pub long_period: usize,
    pub metrics: Metrics,
}

impl ComparisonRow {
    /// Label as printed in the comparison table, e.g. "Golden Cross (50/200)".
    pub fn label(&self) -> String {
        format!("{} ({}/{})", self.name, self.short_period, self.long_period)
    }
}

/// Run every preset with default options and `initial_capital`.
///
/// Rows come back in preset order.
pub fn run_comparison(bars: &[Bar], initial_capital: f64) -> Vec<ComparisonRow> {
    run_presets(bars, &PRESETS, initial_capital)
}

pub fn run_presets(bars: &[Bar], presets: &[Preset], initial_capital: f64) -> Vec<ComparisonRow> {
    info!(presets = presets.len(), bars = bars.len(), "running strategy comparison");

    presets
        .par_iter()
        .map(|preset| {
            let config = StrategyConfig {
                short_period: preset.short_period,
                long_period: preset.long_period,
                initial_capital,
                ..StrategyConfig::default()
            };
            let result = run_backtest(bars, &config);
            ComparisonRow {
                name: preset.name.to_string(),
                short_period: preset.short_period,
                long_period: preset.long_period,
                metrics: Metrics::compute(bars, &result, initial_capital),
            }
        })
        .collect()
}

/// Row with the highest total return.
pub fn best_by_return(rows: &[ComparisonRow]) -> Option<&ComparisonRow> {
    rows.iter().max_by(|a, b| {
        a.metrics
            .total_return
            .partial_cmp(&b.metrics.total_return)
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}

//! Strategy configuration.
//!
//! `StrategyConfig` is immutable for the lifetime of a run; all live
//! position fields live in [`RunState`](crate::domain::position::RunState).

use crate::domain::indicator::{bollinger, macd, rsi, IndicatorType};

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub short_period: usize,
    pub long_period: usize,
    pub initial_capital: f64,
    pub use_rsi: bool,
    pub use_ema: bool,
    pub use_macd: bool,
    pub use_bollinger: bool,
    /// Fraction of the entry price, e.g. 0.05 for 5%. 0 disables.
    pub stop_loss_pct: f64,
    /// Fraction of the entry price, e.g. 0.15 for 15%. 0 disables.
    pub take_profit_pct: f64,
    pub commission_rate: f64,
    pub use_kelly: bool,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    pub bollinger_mult: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            short_period: 50,
            long_period: 200,
            initial_capital: 100_000.0,
            use_rsi: false,
            use_ema: false,
            use_macd: false,
            use_bollinger: false,
            stop_loss_pct: 0.0,
            take_profit_pct: 0.0,
            commission_rate: 0.001,
            use_kelly: false,
            rsi_period: rsi::DEFAULT_PERIOD,
            macd_fast: macd::DEFAULT_FAST,
            macd_slow: macd::DEFAULT_SLOW,
            macd_signal: macd::DEFAULT_SIGNAL,
            bollinger_period: bollinger::DEFAULT_PERIOD,
            bollinger_mult: bollinger::DEFAULT_MULTIPLIER,
        }
    }
}

impl StrategyConfig {
    /// Short and long crossover averages.
    pub fn crossover_pair(&self) -> (IndicatorType, IndicatorType) {
        if self.use_ema {
            (
                IndicatorType::Ema(self.short_period),
                IndicatorType::Ema(self.long_period),
            )
        } else {
            (
                IndicatorType::Sma(self.short_period),
                IndicatorType::Sma(self.long_period),
            )
        }
    }

    /// Every indicator the run depends on, crossover pair first.
    pub fn active_indicators(&self) -> Vec<IndicatorType> {
        let (short, long) = self.crossover_pair();
        let mut indicators = vec![short, long];
        if self.use_rsi {
            indicators.push(IndicatorType::Rsi(self.rsi_period));
        }
        if self.use_macd {
            indicators.push(IndicatorType::Macd {
                fast: self.macd_fast,
                slow: self.macd_slow,
                signal: self.macd_signal,
            });
        }
        if self.use_bollinger {
            indicators.push(IndicatorType::Bollinger {
                period: self.bollinger_period,
                multiplier: self.bollinger_mult,
            });
        }
        indicators
    }

    /// First bar index at which every configured indicator has warmed up.
    pub fn warmup_index(&self) -> usize {
        self.active_indicators()
            .iter()
            .map(IndicatorType::lookback)
            .max()
            .unwrap_or(self.long_period)
    }

    /// Human-readable label, e.g. "SMA Crossover (50/200)".
    pub fn label(&self) -> String {
        let kind = if self.use_ema { "EMA" } else { "SMA" };
        format!(
            "{} Crossover ({}/{})",
            kind, self.short_period, self.long_period
        )
    }
}

//! Backtest engine and event loop.
//!
//! A run is a fold over the bar sequence: indicators are computed once up
//! front, then [`step`] advances a [`RunState`] bar by bar from the warm-up
//! index. Any position still open after the last bar is closed at that
//! bar's close.

use tracing::{debug, info, warn};

use super::execution::{enter_long, exit_long, exit_on_signal};
use super::indicator::{
    calculate_bollinger, calculate_ema, calculate_macd, calculate_rsi, calculate_sma, rsi,
    BollingerBands, MacdSeries,
};
use super::ohlcv::{closes, Bar};
use super::position::{ClosedTrade, ExitReason, RunState};
use super::strategy::StrategyConfig;

/// Crossover signal for one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Entry,
    Exit,
    Hold,
}

/// Signal produced by moving from `prev_above` to `above`, where "above"
/// means the short average is strictly above the long one.
pub fn crossover_signal(prev_above: bool, above: bool) -> Signal {
    match (prev_above, above) {
        (false, true) => Signal::Entry,
        (true, false) => Signal::Exit,
        _ => Signal::Hold,
    }
}

/// Every series a run reads, aligned with the bars.
#[derive(Debug, Clone)]
pub struct IndicatorSet {
    pub closes: Vec<f64>,
    pub short: Vec<f64>,
    pub long: Vec<f64>,
    pub rsi: Option<Vec<f64>>,
    pub macd: Option<MacdSeries>,
    pub bollinger: Option<BollingerBands>,
}

impl IndicatorSet {
    pub fn compute(bars: &[Bar], config: &StrategyConfig) -> Self {
        let closes = closes(bars);

        let (short, long) = if config.use_ema {
            (
                calculate_ema(&closes, config.short_period),
                calculate_ema(&closes, config.long_period),
            )
        } else {
            (
                calculate_sma(&closes, config.short_period),
                calculate_sma(&closes, config.long_period),
            )
        };

        let rsi = config
            .use_rsi
            .then(|| calculate_rsi(&closes, config.rsi_period));
        let macd = config.use_macd.then(|| {
            calculate_macd(
                &closes,
                config.macd_fast,
                config.macd_slow,
                config.macd_signal,
            )
        });
        let bollinger = config.use_bollinger.then(|| {
            calculate_bollinger(&closes, config.bollinger_period, config.bollinger_mult)
        });

        IndicatorSet {
            closes,
            short,
            long,
            rsi,
            macd,
            bollinger,
        }
    }

    /// Whether the enabled filters let an entry signal on bar `index` through.
    ///
    /// Filters only ever veto an entry; they never create one.
    pub fn entry_allowed(&self, index: usize) -> bool {
        let overbought = self
            .rsi
            .as_ref()
            .is_some_and(|values| values[index] >= rsi::OVERBOUGHT);
        let no_momentum = self
            .macd
            .as_ref()
            .is_some_and(|macd| macd.histogram[index] <= 0.0);
        let above_band = self
            .bollinger
            .as_ref()
            .is_some_and(|bands| self.closes[index] > bands.upper[index]);
        !(overbought || no_momentum || above_band)
    }
}

/// Outcome of one run: the final state plus what metrics need to replay it.
#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub state: RunState,
    /// First bar index the engine evaluated.
    pub warmup_index: usize,
    pub bar_count: usize,
}

impl BacktestResult {
    pub fn trades(&self) -> &[ClosedTrade] {
        &self.state.closed_trades
    }

    /// Cash plus any shares still held, marked at the last close.
    pub fn final_value(&self, bars: &[Bar]) -> f64 {
        match bars.last() {
            Some(last) if self.state.is_long() => self.state.equity(last.close),
            _ => self.state.cash,
        }
    }
}

/// Advance the run by one bar.
///
/// Order of evaluation:
/// 1. Stop-loss, then take-profit, against this bar's close (exits skip the rest)
/// 2. Crossover signal against the previous evaluated bar
/// 3. Entry filters
/// 4. Enter when flat, exit when long
pub fn step(
    state: &mut RunState,
    bars: &[Bar],
    indicators: &IndicatorSet,
    index: usize,
    config: &StrategyConfig,
) {
    let above = indicators.short[index] > indicators.long[index];
    let prev_above = state.prev_short_above.replace(above);

    if let Some(position) = &state.position {
        let close = bars[index].close;
        let risk_exit = if position.should_stop_loss(close, config.stop_loss_pct) {
            Some(ExitReason::StopLoss)
        } else if position.should_take_profit(close, config.take_profit_pct) {
            Some(ExitReason::TakeProfit)
        } else {
            None
        };

        if let Some(reason) = risk_exit {
            exit_on_signal(state, bars, index, reason, config);
            return;
        }
    }

    // first evaluated bar has nothing to compare against
    let Some(prev_above) = prev_above else {
        return;
    };

    match crossover_signal(prev_above, above) {
        Signal::Entry if !state.is_long() => {
            if indicators.entry_allowed(index) {
                enter_long(state, bars, index, config);
            } else {
                debug!(date = %bars[index].date, "entry signal filtered");
            }
        }
        Signal::Exit if state.is_long() => {
            exit_on_signal(state, bars, index, ExitReason::Signal, config);
        }
        _ => {}
    }
}

/// Run one backtest over `bars` with `config`.
///
/// Sequences shorter than the long period + 1 produce no trades.
pub fn run_backtest(bars: &[Bar], config: &StrategyConfig) -> BacktestResult {
    let mut state = RunState::new(config.initial_capital);
    let warmup_index = config.warmup_index();

    if bars.len() < config.long_period + 1 {
        warn!(
            bars = bars.len(),
            required = config.long_period + 1,
            "insufficient data for backtesting"
        );
        return BacktestResult {
            state,
            warmup_index,
            bar_count: bars.len(),
        };
    }

    let indicators = IndicatorSet::compute(bars, config);
    for index in warmup_index..bars.len() {
        step(&mut state, bars, &indicators, index, config);
    }

    if state.is_long() {
        let last = bars.len() - 1;
        exit_long(
            &mut state,
            bars,
            last,
            bars[last].close,
            ExitReason::EndOfData,
            config,
        );
    }

    info!(
        strategy = %config.label(),
        bars = bars.len(),
        trades = state.closed_trades.len(),
        cash = state.cash,
        "backtest complete"
    );

    BacktestResult {
        state,
        warmup_index,
        bar_count: bars.len(),
    }
}

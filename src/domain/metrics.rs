//! Performance metrics and statistics.
//!
//! All percentages are expressed in percent (12.5 means 12.5%).

use chrono::Datelike;

use super::backtest::BacktestResult;
use super::ohlcv::Bar;
use super::position::ClosedTrade;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Profit factor reported when there are wins but no losses.
pub const PROFIT_FACTOR_NO_LOSSES: f64 = 999.99;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub initial_capital: f64,
    pub final_value: f64,
    pub total_return: f64,
    pub cagr: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub num_trades: usize,
    pub winning_trades: usize,
    pub win_rate: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub profit_factor: f64,
}

impl Metrics {
    pub fn compute(bars: &[Bar], result: &BacktestResult, initial_capital: f64) -> Self {
        let trades = result.trades();
        let final_value = result.final_value(bars);

        let (Some(first), Some(last)) = (bars.first(), bars.last()) else {
            return Metrics {
                initial_capital,
                final_value: initial_capital,
                total_return: 0.0,
                cagr: 0.0,
                max_drawdown: 0.0,
                sharpe_ratio: 0.0,
                num_trades: 0,
                winning_trades: 0,
                win_rate: 0.0,
                avg_win: 0.0,
                avg_loss: 0.0,
                profit_factor: 0.0,
            };
        };

        let (total_return, cagr) = if initial_capital > 0.0 {
            let growth = final_value / initial_capital;
            let years = years_between(first, last);
            (
                (growth - 1.0) * 100.0,
                (growth.powf(1.0 / years) - 1.0) * 100.0,
            )
        } else {
            (0.0, 0.0)
        };

        let max_drawdown = compute_drawdown(bars, trades, result.warmup_index, initial_capital);
        let sharpe_ratio = compute_sharpe(trades, bars.len());

        let mut winning_trades = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;
        for trade in trades {
            if trade.is_win() {
                winning_trades += 1;
                total_wins += trade.pnl;
            } else {
                total_losses += -trade.pnl;
            }
        }

        let num_trades = trades.len();
        let losing_trades = num_trades - winning_trades;

        let win_rate = if num_trades > 0 {
            winning_trades as f64 / num_trades as f64 * 100.0
        } else {
            0.0
        };

        let avg_win = if winning_trades > 0 {
            total_wins / winning_trades as f64
        } else {
            0.0
        };

        let avg_loss = if losing_trades > 0 {
            total_losses / losing_trades as f64
        } else {
            0.0
        };

        let profit_factor = if total_losses > 0.0 {
            total_wins / total_losses
        } else if total_wins > 0.0 {
            PROFIT_FACTOR_NO_LOSSES
        } else {
            0.0
        };

        Metrics {
            initial_capital,
            final_value,
            total_return,
            cagr,
            max_drawdown,
            sharpe_ratio,
            num_trades,
            winning_trades,
            win_rate,
            avg_win,
            avg_loss,
            profit_factor,
        }
    }
}

/// Whole calendar years between two bars, floored at 1.
pub fn years_between(first: &Bar, last: &Bar) -> f64 {
    let years = last.date.year() - first.date.year();
    if years > 0 { years as f64 } else { 1.0 }
}

/// Maximum peak-to-trough decline of replayed equity, in percent.
///
/// Replays from `start` with equity = `initial_capital`. While a trade is
/// open equity is marked to the bar's close; on its exit bar equity becomes
/// the trade's net proceeds and holds there until the next entry, which
/// may fill on that same bar.
pub fn compute_drawdown(
    bars: &[Bar],
    trades: &[ClosedTrade],
    start: usize,
    initial_capital: f64,
) -> f64 {
    let mut peak = initial_capital;
    let mut equity = initial_capital;
    let mut max_dd = 0.0_f64;
    let mut next_trade = 0usize;
    let mut holding = false;

    for (index, bar) in bars.iter().enumerate().skip(start) {
        // one bar can close a trade and open the next
        while let Some(trade) = trades.get(next_trade) {
            if !holding {
                if index != trade.entry_index {
                    break;
                }
                holding = true;
            }
            equity = trade.shares * bar.close;
            if index != trade.exit_index {
                break;
            }
            holding = false;
            equity = trade.exit_value();
            next_trade += 1;
        }

        if equity > peak {
            peak = equity;
        }
        if peak > 0.0 {
            let dd = (peak - equity) / peak * 100.0;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}

/// Per-trade Sharpe ratio, annualized by the average bars per trade.
///
/// sharpe = mean / stddev * sqrt(252 / (bar_count / trades)), using
/// population standard deviation of trade returns. Zero when there are no
/// trades or the returns do not vary.
pub fn compute_sharpe(trades: &[ClosedTrade], bar_count: usize) -> f64 {
    if trades.is_empty() || bar_count == 0 {
        return 0.0;
    }

    let returns: Vec<f64> = trades.iter().map(|t| t.return_pct / 100.0).collect();
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev == 0.0 {
        return 0.0;
    }

    let bars_per_trade = bar_count as f64 / n;
    (mean / stddev) * (TRADING_DAYS_PER_YEAR / bars_per_trade).sqrt()
}

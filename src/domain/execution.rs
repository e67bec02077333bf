//! Trade execution and fill simulation.
//!
//! Implements the fill-price convention, proportional commissions,
//! Kelly position sizing, and the enter/exit transitions of [`RunState`].

use tracing::debug;

use super::ohlcv::Bar;
use super::position::{ClosedTrade, ExitReason, Position, RunState};
use super::strategy::StrategyConfig;

/// Completed trades required before Kelly sizing kicks in.
pub const KELLY_MIN_TRADES: usize = 5;

/// Fraction of the full Kelly bet actually committed.
pub const KELLY_SCALE: f64 = 0.5;

/// Proportional commission: trade_value * rate.
pub fn calculate_commission(trade_value: f64, commission_rate: f64) -> f64 {
    trade_value * commission_rate
}

/// Where an order signalled on bar `index` fills.
///
/// Next bar's open when it exists and is positive, else this bar's close.
/// Returns the fill bar index and the fill price.
pub fn fill_price(bars: &[Bar], index: usize) -> (usize, f64) {
    match bars.get(index + 1) {
        Some(next) if next.open > 0.0 => (index + 1, next.open),
        _ => (index, bars[index].close),
    }
}

/// Half-Kelly allocation fraction from the closed-trade history, in [0, 1].
///
/// Returns 1 (full allocation) with fewer than [`KELLY_MIN_TRADES`] trades,
/// when every trade is a win or every trade is a loss, or when the average
/// loss is zero.
pub fn kelly_fraction(trades: &[ClosedTrade]) -> f64 {
    if trades.len() < KELLY_MIN_TRADES {
        return 1.0;
    }

    let mut wins = 0usize;
    let mut total_win_return = 0.0;
    let mut total_loss_return = 0.0;
    for trade in trades {
        if trade.is_win() {
            wins += 1;
            total_win_return += trade.return_pct;
        } else {
            total_loss_return += -trade.return_pct;
        }
    }

    let losses = trades.len() - wins;
    if wins == 0 || losses == 0 {
        return 1.0;
    }

    let win_rate = wins as f64 / trades.len() as f64;
    let avg_win = total_win_return / wins as f64;
    let avg_loss = total_loss_return / losses as f64;
    if avg_loss == 0.0 {
        return 1.0;
    }

    // Kelly = W - (1-W)/R where R = avg_win / avg_loss
    let kelly = win_rate - (1.0 - win_rate) / (avg_win / avg_loss);
    (kelly * KELLY_SCALE).clamp(0.0, 1.0)
}

/// Enter a long position on a signal at bar `index`.
///
/// Steps:
/// 1. Resolve the fill bar and price
/// 2. Deduct commission on the whole cash balance
/// 3. Commit the Kelly fraction (or everything) of what remains
/// 4. Cash drops to zero; the open-trade slot is filled
pub fn enter_long(state: &mut RunState, bars: &[Bar], index: usize, config: &StrategyConfig) {
    let (fill_index, price) = fill_price(bars, index);

    let commission = calculate_commission(state.cash, config.commission_rate);
    let available = state.cash - commission;

    let fraction = if config.use_kelly && state.closed_trades.len() >= KELLY_MIN_TRADES {
        kelly_fraction(&state.closed_trades)
    } else {
        1.0
    };

    let shares = (available * fraction / price).max(0.0);
    state.shares = shares;
    state.cash = 0.0;

    let fill_bar = &bars[fill_index];
    debug!(
        date = %fill_bar.date,
        price,
        shares,
        fraction,
        "entered long"
    );

    state.position = Some(Position {
        entry_index: fill_index,
        entry_date: fill_bar.date,
        entry_price: price,
        shares,
    });
}

/// Close the open position at `price`, filled on bar `fill_index`.
///
/// Returns the recorded trade, or `None` when flat.
pub fn exit_long(
    state: &mut RunState,
    bars: &[Bar],
    fill_index: usize,
    price: f64,
    reason: ExitReason,
    config: &StrategyConfig,
) -> Option<ClosedTrade> {
    let position = state.position.take()?;

    let gross = position.market_value(price);
    let commission = calculate_commission(gross, config.commission_rate);
    let proceeds = gross - commission;

    state.cash = proceeds;
    state.shares = 0.0;

    let cost = position.cost_basis();
    let pnl = proceeds - cost;
    let return_pct = if cost > 0.0 { pnl / cost * 100.0 } else { 0.0 };

    let exit_date = bars[fill_index].date;
    debug!(date = %exit_date, price, pnl, ?reason, "exited long");

    let trade = ClosedTrade {
        entry_index: position.entry_index,
        exit_index: fill_index,
        entry_date: position.entry_date,
        exit_date,
        entry_price: position.entry_price,
        exit_price: price,
        shares: position.shares,
        pnl,
        return_pct,
        exit_reason: reason,
    };
    state.closed_trades.push(trade.clone());
    Some(trade)
}

/// Exit on a signal (or risk trigger) at bar `index`, using the next-bar fill.
pub fn exit_on_signal(
    state: &mut RunState,
    bars: &[Bar],
    index: usize,
    reason: ExitReason,
    config: &StrategyConfig,
) -> Option<ClosedTrade> {
    let (fill_index, price) = fill_price(bars, index);
    exit_long(state, bars, fill_index, price, reason, config)
}

//! Position tracking: the open-trade slot, the closed-trade ledger and the
//! per-run mutable state.

use chrono::NaiveDate;

/// The single open long position of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub entry_index: usize,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub shares: f64,
}

impl Position {
    pub fn cost_basis(&self) -> f64 {
        self.shares * self.entry_price
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.shares * price
    }

    /// Price move relative to entry as a fraction (0.05 = +5%).
    pub fn price_change(&self, price: f64) -> f64 {
        (price - self.entry_price) / self.entry_price
    }

    pub fn should_stop_loss(&self, price: f64, stop_loss_pct: f64) -> bool {
        if stop_loss_pct <= 0.0 {
            return false;
        }
        self.price_change(price) <= -stop_loss_pct
    }

    pub fn should_take_profit(&self, price: f64, take_profit_pct: f64) -> bool {
        if take_profit_pct <= 0.0 {
            return false;
        }
        self.price_change(price) >= take_profit_pct
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Signal,
    StopLoss,
    TakeProfit,
    EndOfData,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub entry_index: usize,
    pub exit_index: usize,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_price: f64,
    pub exit_price: f64,
    pub shares: f64,
    pub pnl: f64,
    pub return_pct: f64,
    pub exit_reason: ExitReason,
}

impl ClosedTrade {
    pub fn is_win(&self) -> bool {
        self.pnl > 0.0
    }

    pub fn cost_basis(&self) -> f64 {
        self.shares * self.entry_price
    }

    /// Net proceeds realized by the exit, after commission.
    pub fn exit_value(&self) -> f64 {
        self.cost_basis() + self.pnl
    }
}

/// Mutable state threaded through one simulation run.
///
/// Invariant: `cash == 0` while `position` is `Some`, `shares == 0` while it
/// is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct RunState {
    pub cash: f64,
    pub shares: f64,
    pub position: Option<Position>,
    pub closed_trades: Vec<ClosedTrade>,
    /// Whether the short average was above the long one on the previous
    /// evaluated bar. `None` before the first evaluated bar.
    pub prev_short_above: Option<bool>,
}

impl RunState {
    pub fn new(initial_capital: f64) -> Self {
        RunState {
            cash: initial_capital,
            shares: 0.0,
            position: None,
            closed_trades: Vec::new(),
            prev_short_above: None,
        }
    }

    pub fn is_long(&self) -> bool {
        self.position.is_some()
    }

    /// Cash plus the marked value of any open shares.
    pub fn equity(&self, price: f64) -> f64 {
        self.cash + self.shares * price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_position() -> Position {
        Position {
            entry_index: 10,
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            entry_price: 50.0,
            shares: 100.0,
        }
    }

    fn sample_trade(pnl: f64) -> ClosedTrade {
        ClosedTrade {
            entry_index: 10,
            exit_index: 15,
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            exit_date: NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
            entry_price: 50.0,
            exit_price: 55.0,
            shares: 100.0,
            pnl,
            return_pct: pnl / 5000.0 * 100.0,
            exit_reason: ExitReason::Signal,
        }
    }

    #[test]
    fn market_value_and_cost_basis() {
        let pos = sample_position();
        assert!((pos.cost_basis() - 5000.0).abs() < f64::EPSILON);
        assert!((pos.market_value(55.0) - 5500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stop_loss_triggered() {
        let pos = sample_position();
        assert!(pos.should_stop_loss(47.0, 0.05));
        assert!(pos.should_stop_loss(47.5, 0.05));
        assert!(!pos.should_stop_loss(48.0, 0.05));
    }

    #[test]
    fn stop_loss_disabled() {
        let pos = sample_position();
        assert!(!pos.should_stop_loss(0.01, 0.0));
        assert!(!pos.should_stop_loss(0.01, -0.1));
    }

    #[test]
    fn take_profit_triggered() {
        let pos = sample_position();
        assert!(pos.should_take_profit(60.0, 0.15));
        assert!(pos.should_take_profit(57.5, 0.15));
        assert!(!pos.should_take_profit(57.0, 0.15));
    }

    #[test]
    fn take_profit_disabled() {
        let pos = sample_position();
        assert!(!pos.should_take_profit(1_000_000.0, 0.0));
    }

    #[test]
    fn closed_trade_win_and_exit_value() {
        let win = sample_trade(485.0);
        assert!(win.is_win());
        assert!((win.exit_value() - 5485.0).abs() < 1e-9);

        let flat = sample_trade(0.0);
        assert!(!flat.is_win());
    }

    #[test]
    fn run_state_starts_flat() {
        let state = RunState::new(100_000.0);
        assert!(!state.is_long());
        assert_eq!(state.cash, 100_000.0);
        assert_eq!(state.shares, 0.0);
        assert!(state.closed_trades.is_empty());
        assert!(state.prev_short_above.is_none());
    }

    #[test]
    fn run_state_equity_marks_shares() {
        let mut state = RunState::new(0.0);
        state.shares = 10.0;
        assert!((state.equity(12.5) - 125.0).abs() < f64::EPSILON);
    }
}

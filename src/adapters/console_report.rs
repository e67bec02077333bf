//! Human-readable console output: run header, results summary and the
//! strategy comparison table.

use crate::domain::comparison::ComparisonRow;
use crate::domain::metrics::Metrics;
use crate::domain::ohlcv::Bar;
use crate::domain::strategy::StrategyConfig;

/// Strategy label, capital and the list of enabled features.
pub fn format_run_header(config: &StrategyConfig, source: &str, bars: &[Bar]) -> String {
    let mut out = String::new();
    out.push_str("=== Crossover Backtest ===\n");
    out.push_str(&format!("Data: {}\n", source));
    out.push_str(&format!("Strategy: {}\n", config.label()));
    out.push_str(&format!("Initial Capital: ${:.2}\n", config.initial_capital));

    let features = enabled_features(config);
    if !features.is_empty() {
        out.push_str("\nEnabled Features:\n");
        for feature in &features {
            out.push_str(&format!("  - {}\n", feature));
        }
    }

    if let (Some(first), Some(last)) = (bars.first(), bars.last()) {
        out.push_str(&format!("\nLoaded {} trading days\n", bars.len()));
        out.push_str(&format!("Period: {} to {}\n", first.date, last.date));
    }
    out
}

pub fn enabled_features(config: &StrategyConfig) -> Vec<String> {
    let mut features = Vec::new();
    if config.use_rsi {
        features.push(format!("RSI Filter ({})", config.rsi_period));
    }
    if config.use_macd {
        features.push(format!(
            "MACD Confirmation ({}/{}/{})",
            config.macd_fast, config.macd_slow, config.macd_signal
        ));
    }
    if config.use_bollinger {
        features.push(format!(
            "Bollinger Bands ({}, {})",
            config.bollinger_period, config.bollinger_mult
        ));
    }
    if config.stop_loss_pct > 0.0 {
        features.push(format!("Stop Loss: {}%", config.stop_loss_pct * 100.0));
    }
    if config.take_profit_pct > 0.0 {
        features.push(format!("Take Profit: {}%", config.take_profit_pct * 100.0));
    }
    if config.commission_rate > 0.0 {
        features.push(format!("Commission: {}%", config.commission_rate * 100.0));
    }
    if config.use_kelly {
        features.push("Kelly Criterion Position Sizing".to_string());
    }
    features
}

pub fn format_summary(metrics: &Metrics) -> String {
    let mut out = String::new();
    out.push_str("\n=== BACKTEST RESULTS ===\n");
    out.push_str(&format!("Initial Capital: ${:.2}\n", metrics.initial_capital));
    out.push_str(&format!("Final Value: ${:.2}\n", metrics.final_value));
    out.push_str(&format!("Total Return: {:.2}%\n", metrics.total_return));
    out.push_str(&format!("CAGR: {:.2}%\n", metrics.cagr));
    out.push_str(&format!("Max Drawdown: {:.2}%\n", metrics.max_drawdown));
    out.push_str(&format!("Sharpe Ratio: {:.3}\n", metrics.sharpe_ratio));
    out.push_str(&format!(
        "Trades: {} ({} wins, {:.1}% win rate)\n",
        metrics.num_trades, metrics.winning_trades, metrics.win_rate
    ));
    out.push_str(&format!("Profit Factor: {:.2}\n", metrics.profit_factor));
    out
}

pub fn format_comparison_table(rows: &[ComparisonRow]) -> String {
    let mut out = String::new();
    out.push_str("\n=== STRATEGY COMPARISON ===\n");
    out.push_str(&format!(
        "{:<20}{:>12}{:>10}{:>10}{:>12}\n",
        "Strategy", "Return %", "Trades", "Sharpe", "Max DD %"
    ));
    out.push_str(&"-".repeat(64));
    out.push('\n');
    for row in rows {
        let m = &row.metrics;
        out.push_str(&format!(
            "{:<20}{:>12.1}{:>10}{:>10.2}{:>12.1}\n",
            row.name, m.total_return, m.num_trades, m.sharpe_ratio, m.max_drawdown
        ));
    }
    out
}

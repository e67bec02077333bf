//! Comma-separated report file: a summary block followed by the trade log.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::CrossbtError;
use crate::domain::metrics::Metrics;
use crate::domain::position::ClosedTrade;
use crate::ports::report_port::ReportPort;

pub const TRADE_LOG_HEADER: &str = "Entry Date,Exit Date,Entry Price,Exit Price,Shares,P&L,Return %";

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

pub fn write_summary<W: Write>(out: &mut W, metrics: &Metrics) -> std::io::Result<()> {
    writeln!(out, "BACKTEST SUMMARY")?;
    writeln!(out, "================")?;
    writeln!(out)?;
    writeln!(out, "Initial Capital,${:.2}", metrics.initial_capital)?;
    writeln!(out, "Final Value,${:.2}", metrics.final_value)?;
    writeln!(out, "Total Return,{:.2}%", metrics.total_return)?;
    writeln!(out, "CAGR,{:.2}%", metrics.cagr)?;
    writeln!(out, "Max Drawdown,{:.2}%", metrics.max_drawdown)?;
    writeln!(out, "Sharpe Ratio,{:.3}", metrics.sharpe_ratio)?;
    writeln!(out, "Number of Trades,{}", metrics.num_trades)?;
    writeln!(out, "Winning Trades,{}", metrics.winning_trades)?;
    writeln!(out, "Win Rate,{:.2}%", metrics.win_rate)?;
    writeln!(out, "Average Win,${:.2}", metrics.avg_win)?;
    writeln!(out, "Average Loss,${:.2}", metrics.avg_loss)?;
    writeln!(out, "Profit Factor,{:.2}", metrics.profit_factor)?;
    Ok(())
}

pub fn write_trade_log<W: Write>(out: &mut W, trades: &[ClosedTrade]) -> std::io::Result<()> {
    writeln!(out, "TRADE LOG")?;
    writeln!(out, "=========")?;
    writeln!(out, "{}", TRADE_LOG_HEADER)?;
    for trade in trades {
        writeln!(
            out,
            "{},{},{:.2},{:.2},{:.4},{:.2},{:.2}%",
            trade.entry_date,
            trade.exit_date,
            trade.entry_price,
            trade.exit_price,
            trade.shares,
            trade.pnl,
            trade.return_pct
        )?;
    }
    Ok(())
}

pub fn write_report<W: Write>(
    out: &mut W,
    result: &BacktestResult,
    metrics: &Metrics,
) -> std::io::Result<()> {
    write_summary(out, metrics)?;
    writeln!(out)?;
    write_trade_log(out, result.trades())?;
    out.flush()
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        metrics: &Metrics,
        output_path: &Path,
    ) -> Result<(), CrossbtError> {
        let report_err = |e: std::io::Error| CrossbtError::Report {
            path: output_path.display().to_string(),
            reason: e.to_string(),
        };

        if let Some(parent) = output_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
        {
            fs::create_dir_all(parent).map_err(report_err)?;
        }

        let file = File::create(output_path).map_err(report_err)?;
        let mut out = BufWriter::new(file);
        write_report(&mut out, result, metrics).map_err(report_err)?;

        info!(path = %output_path.display(), trades = result.trades().len(), "report written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::{ExitReason, RunState};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sample_trade() -> ClosedTrade {
        ClosedTrade {
            entry_index: 1,
            exit_index: 5,
            entry_date: NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(),
            exit_date: NaiveDate::from_ymd_opt(2020, 3, 4).unwrap(),
            entry_price: 100.0,
            exit_price: 120.0,
            shares: 999.0,
            pnl: 19_780.0,
            return_pct: 19.78,
            exit_reason: ExitReason::Signal,
        }
    }

    fn sample_result() -> BacktestResult {
        let mut state = RunState::new(119_780.0);
        state.closed_trades.push(sample_trade());
        BacktestResult {
            state,
            warmup_index: 0,
            bar_count: 10,
        }
    }

    fn sample_metrics() -> Metrics {
        Metrics {
            initial_capital: 100_000.0,
            final_value: 119_780.0,
            total_return: 19.78,
            cagr: 19.78,
            max_drawdown: 3.5,
            sharpe_ratio: 1.23456,
            num_trades: 1,
            winning_trades: 1,
            win_rate: 100.0,
            avg_win: 19_780.0,
            avg_loss: 0.0,
            profit_factor: 999.99,
        }
    }

    fn render() -> String {
        let mut buf = Vec::new();
        write_report(&mut buf, &sample_result(), &sample_metrics()).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn summary_block_layout() {
        let text = render();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "BACKTEST SUMMARY");
        assert_eq!(lines[1], "================");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "Initial Capital,$100000.00");
        assert_eq!(lines[4], "Final Value,$119780.00");
        assert_eq!(lines[5], "Total Return,19.78%");
        assert_eq!(lines[8], "Sharpe Ratio,1.235");
        assert_eq!(lines[9], "Number of Trades,1");
        assert_eq!(lines[14], "Profit Factor,999.99");
        assert_eq!(lines[15], "");
    }

    #[test]
    fn trade_log_rows() {
        let text = render();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[16], "TRADE LOG");
        assert_eq!(lines[17], "=========");
        assert_eq!(lines[18], TRADE_LOG_HEADER);
        assert_eq!(
            lines[19],
            "2020-01-02,2020-03-04,100.00,120.00,999.0000,19780.00,19.78%"
        );
        assert_eq!(lines.len(), 20);
    }

    #[test]
    fn write_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results").join("nested").join("out.csv");

        CsvReportAdapter::new()
            .write(&sample_result(), &sample_metrics(), &path)
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("BACKTEST SUMMARY\n"));
        assert!(content.contains("TRADE LOG\n"));
    }

    #[test]
    fn unwritable_path_is_report_error() {
        let dir = TempDir::new().unwrap();
        // a directory cannot be opened as a file
        let result = CsvReportAdapter::new().write(&sample_result(), &sample_metrics(), dir.path());
        assert!(matches!(result, Err(CrossbtError::Report { .. })));
    }
}

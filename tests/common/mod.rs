#![allow(dead_code)]

use chrono::NaiveDate;
use crossbt::domain::backtest::BacktestResult;
use crossbt::domain::error::CrossbtError;
pub use crossbt::domain::ohlcv::Bar;
use crossbt::domain::metrics::Metrics;
use crossbt::ports::data_port::DataPort;
use crossbt::ports::report_port::ReportPort;
use std::cell::RefCell;
use std::path::{Path, PathBuf};

pub struct MockDataPort {
    pub bars: Vec<Bar>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new(bars: Vec<Bar>) -> Self {
        Self { bars, error: None }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            bars: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(&self) -> Result<Vec<Bar>, CrossbtError> {
        if let Some(reason) = &self.error {
            return Err(CrossbtError::DataSource {
                path: self.source_name(),
                reason: reason.clone(),
            });
        }
        Ok(self.bars.clone())
    }

    fn source_name(&self) -> String {
        "mock".to_string()
    }
}

/// Records what it was asked to write instead of touching the filesystem.
#[derive(Default)]
pub struct MockReportPort {
    pub written: RefCell<Vec<(PathBuf, usize, Metrics)>>,
}

impl ReportPort for MockReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        metrics: &Metrics,
        output_path: &Path,
    ) -> Result<(), CrossbtError> {
        self.written.borrow_mut().push((
            output_path.to_path_buf(),
            result.trades().len(),
            metrics.clone(),
        ));
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: NaiveDate, open: f64, close: f64) -> Bar {
    Bar {
        date,
        open,
        high: open.max(close),
        low: open.min(close),
        close,
        adj_close: close,
        volume: 1_000,
    }
}

/// Consecutive daily bars from `start`, opening and closing at each price.
pub fn bars_from_prices(start: NaiveDate, prices: &[f64]) -> Vec<Bar> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &p)| make_bar(start + chrono::Duration::days(i as i64), p, p))
        .collect()
}

/// Flat at `base` for `flat` bars, then rising by `step` per bar.
pub fn flat_then_rising(n: usize, flat: usize, base: f64, step: f64) -> Vec<f64> {
    (0..n)
        .map(|i| {
            if i < flat {
                base
            } else {
                base + step * (i + 1 - flat) as f64
            }
        })
        .collect()
}

/// A slow sine wave on an upward drift; produces several crossovers.
pub fn wave_prices(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + 15.0 * (i as f64 / 20.0).sin() + i as f64 * 0.02)
        .collect()
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

pub fn bars_to_csv(bars: &[Bar]) -> String {
    let mut out = String::from("Date,Open,High,Low,Close,Adj Close,Volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            b.date, b.open, b.high, b.low, b.close, b.adj_close, b.volume
        ));
    }
    out
}

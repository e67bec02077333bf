//! CSV file data adapter.
//!
//! Expects `Date,Open,High,Low,Close,Adj Close,Volume`. Parsing is lenient:
//! missing or malformed numeric fields read as 0, and rows whose date
//! cannot be parsed are skipped with a warning. Only failing to open the
//! file is an error.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, warn};

use crate::domain::error::CrossbtError;
use crate::domain::ohlcv::Bar;
use crate::ports::data_port::DataPort;

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

/// Parse a `%Y-%m-%d` date, optionally followed by a time component.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let (date, rest) = NaiveDate::parse_and_remainder(value, "%Y-%m-%d").ok()?;
    if rest.is_empty() || rest.starts_with([' ', 'T']) {
        Some(date)
    } else {
        None
    }
}

fn parse_f64(record: &StringRecord, index: usize) -> f64 {
    record
        .get(index)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn parse_i64(record: &StringRecord, index: usize) -> i64 {
    let Some(raw) = record.get(index) else {
        return 0;
    };
    raw.parse::<i64>()
        .ok()
        .or_else(|| {
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(|v| v.trunc() as i64)
        })
        .unwrap_or(0)
}

fn parse_record(record: &StringRecord) -> Option<Bar> {
    let date = parse_date(record.get(0)?)?;
    Some(Bar {
        date,
        open: parse_f64(record, 1),
        high: parse_f64(record, 2),
        low: parse_f64(record, 3),
        close: parse_f64(record, 4),
        adj_close: parse_f64(record, 5),
        volume: parse_i64(record, 6),
    })
}

impl DataPort for CsvAdapter {
    fn fetch_bars(&self) -> Result<Vec<Bar>, CrossbtError> {
        let file = File::open(&self.path).map_err(|e| CrossbtError::DataSource {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(file);

        let mut bars = Vec::new();
        for (line, result) in rdr.records().enumerate() {
            // header is line 1
            let line = line + 2;
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    warn!(line, error = %e, "skipping unreadable row");
                    continue;
                }
            };
            if record.iter().all(str::is_empty) {
                continue;
            }
            match parse_record(&record) {
                Some(bar) => bars.push(bar),
                None => warn!(line, date = record.get(0).unwrap_or(""), "skipping row with bad date"),
            }
        }

        debug!(path = %self.path.display(), bars = bars.len(), "loaded bars");
        Ok(bars)
    }

    fn source_name(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn fetch_bars_returns_correct_data() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "AAPL.csv",
            "Date,Open,High,Low,Close,Adj Close,Volume\n\
             2024-01-15,100.0,110.0,90.0,105.0,104.5,50000\n\
             2024-01-16,105.0,115.0,100.0,110.0,109.5,60000\n",
        );

        let bars = CsvAdapter::new(&path).fetch_bars().unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].high, 110.0);
        assert_eq!(bars[0].low, 90.0);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[0].adj_close, 104.5);
        assert_eq!(bars[0].volume, 50000);
        assert_eq!(bars[1].close, 110.0);
    }

    #[test]
    fn fields_are_trimmed_and_blank_lines_skipped() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "trim.csv",
            "Date,Open,High,Low,Close,Adj Close,Volume\n\
             \n\
             2024-01-15 , 100.0 , 110.0, 90.0 ,105.0,105.0, 700 \n\
             \n",
        );

        let bars = CsvAdapter::new(&path).fetch_bars().unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].volume, 700);
    }

    #[test]
    fn malformed_and_missing_numbers_read_as_zero() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "lenient.csv",
            "Date,Open,High,Low,Close,Adj Close,Volume\n\
             2024-01-15,abc,110.0,,105.0\n",
        );

        let bars = CsvAdapter::new(&path).fetch_bars().unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].open, 0.0);
        assert_eq!(bars[0].high, 110.0);
        assert_eq!(bars[0].low, 0.0);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[0].adj_close, 0.0);
        assert_eq!(bars[0].volume, 0);
    }

    #[test]
    fn rows_with_bad_dates_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "dates.csv",
            "Date,Open,High,Low,Close,Adj Close,Volume\n\
             not-a-date,1,1,1,1,1,1\n\
             2024-01-16,2,2,2,2,2,2\n",
        );

        let bars = CsvAdapter::new(&path).fetch_bars().unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, 2.0);
    }

    #[test]
    fn parse_date_accepts_time_suffix() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5);
        assert_eq!(parse_date("2024-03-05"), expected);
        assert_eq!(parse_date("2024-03-05 16:00:00"), expected);
        assert_eq!(parse_date("2024-03-05T16:00:00"), expected);
        assert_eq!(parse_date("2024-03-05x"), None);
        assert_eq!(parse_date("03/05/2024"), None);
    }

    #[test]
    fn volume_accepts_decimal_notation() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "vol.csv",
            "Date,Open,High,Low,Close,Adj Close,Volume\n\
             2024-01-15,1,1,1,1,1,1500.0\n",
        );
        let bars = CsvAdapter::new(&path).fetch_bars().unwrap();
        assert_eq!(bars[0].volume, 1500);
    }

    #[test]
    fn header_only_file_yields_no_bars() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "empty.csv", "Date,Open,High,Low,Close,Adj Close,Volume\n");
        let bars = CsvAdapter::new(&path).fetch_bars().unwrap();
        assert!(bars.is_empty());
    }

    #[test]
    fn missing_file_is_data_source_error() {
        let result = CsvAdapter::new("/nonexistent/path/prices.csv").fetch_bars();
        assert!(matches!(result, Err(CrossbtError::DataSource { .. })));
    }
}

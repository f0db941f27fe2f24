//! CSV file data adapter: one `<SYMBOL>.csv` per ticker in a data directory.

use crate::domain::error::TrendscopeError;
use crate::domain::ohlcv::{OhlcvBar, normalize_bars};
use crate::domain::window::FetchRequest;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs::File;
use std::path::PathBuf;
use tracing::debug;

pub struct CsvAdapter {
    base_path: PathBuf,
}

/// Raw row as exported by common market data tools. Unparseable price cells
/// become `None` so the bar is dropped as incomplete instead of failing the file.
#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    open: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    high: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    low: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    close: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    volume: Option<f64>,
}

impl CsvRow {
    fn into_bar(self, symbol: &str) -> Option<OhlcvBar> {
        // Accept "2024-01-02" as well as "2024-01-02 00:00:00+05:30".
        let date = NaiveDate::parse_from_str(self.date.trim().get(..10)?, "%Y-%m-%d").ok()?;
        Some(OhlcvBar {
            symbol: symbol.to_string(),
            date,
            open: self.open?,
            high: self.high?,
            low: self.low?,
            close: self.close?,
            volume: self.volume.filter(|v| v.is_finite()).unwrap_or(0.0) as i64,
        })
    }
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn fetch_error(symbol: &str, reason: String) -> TrendscopeError {
        TrendscopeError::Fetch {
            symbol: symbol.to_string(),
            reason,
        }
    }

    fn read_bars(&self, symbol: &str) -> Result<Vec<OhlcvBar>, TrendscopeError> {
        let path = self.csv_path(symbol);
        let file = File::open(&path).map_err(|e| {
            Self::fetch_error(symbol, format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);
        let headers = rdr
            .headers()
            .map_err(|e| Self::fetch_error(symbol, format!("CSV header error: {}", e)))?
            .iter()
            .map(|h| h.to_lowercase())
            .collect::<csv::StringRecord>();
        rdr.set_headers(headers);

        let mut bars = Vec::new();
        let mut dropped = 0usize;
        for result in rdr.deserialize::<CsvRow>() {
            let row = result
                .map_err(|e| Self::fetch_error(symbol, format!("CSV parse error: {}", e)))?;
            match row.into_bar(symbol) {
                Some(bar) => bars.push(bar),
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            debug!(symbol, dropped, "dropped incomplete rows");
        }
        Ok(bars)
    }
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        request: &FetchRequest,
    ) -> Result<Vec<OhlcvBar>, TrendscopeError> {
        let bars = normalize_bars(self.read_bars(symbol)?);
        let bars = request.window.select(bars);
        debug!(symbol, bars = bars.len(), window = %request.window, "loaded bars");
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::window::{BarInterval, DataWindow, Period};
    use std::fs;
    use tempfile::TempDir;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn range(start: &str, end: &str) -> FetchRequest {
        FetchRequest {
            window: DataWindow::Range {
                start: date(start),
                end: date(end),
            },
            interval: BarInterval::Daily,
        }
    }

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "date,open,high,low,close,volume\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-16,105.0,115.0,100.0,110.0,60000\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000\n";
        fs::write(path.join("GOLDBEES.NS.csv"), csv_content).unwrap();

        let messy = "Date,Open,High,Low,Close,Adj Close,Volume\n\
            2024-01-17,3.0,3.0,3.0,3.0,3.0,300\n\
            2024-01-15,1.0,1.0,1.0,1.0,1.0,100\n\
            2024-01-16,,2.0,2.0,2.0,2.0,200\n\
            2024-01-15,9.0,9.0,9.0,9.0,9.0,900\n\
            2024-01-18,4.0,4.0,4.0,null,4.0,400\n\
            2024-01-19 00:00:00+05:30,5.0,5.0,5.0,5.0,5.0,\n";
        fs::write(path.join("TCS.NS.csv"), messy).unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_ohlcv_returns_correct_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter
            .fetch_ohlcv("GOLDBEES.NS", &range("2024-01-01", "2024-02-01"))
            .unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].symbol, "GOLDBEES.NS");
        assert_eq!(bars[0].date, date("2024-01-15"));
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].high, 110.0);
        assert_eq!(bars[0].low, 90.0);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[0].volume, 50000);
    }

    #[test]
    fn range_end_is_exclusive() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter
            .fetch_ohlcv("GOLDBEES.NS", &range("2024-01-16", "2024-01-17"))
            .unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, date("2024-01-16"));
    }

    #[test]
    fn drops_incomplete_rows_sorts_and_dedups() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter
            .fetch_ohlcv("TCS.NS", &range("2024-01-01", "2024-02-01"))
            .unwrap();

        let dates: Vec<_> = bars.iter().map(|b| b.date).collect();
        assert_eq!(
            dates,
            vec![date("2024-01-15"), date("2024-01-17"), date("2024-01-19")]
        );
        // First row seen for a duplicated date wins.
        assert_eq!(bars[0].close, 1.0);
        // Missing volume is not a missing price.
        assert_eq!(bars[2].volume, 0);
    }

    #[test]
    fn lookback_is_anchored_at_last_bar() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let request = FetchRequest {
            window: DataWindow::Lookback(Period::Days(1)),
            interval: BarInterval::Daily,
        };

        let bars = adapter.fetch_ohlcv("GOLDBEES.NS", &request).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, date("2024-01-17"));
    }

    #[test]
    fn window_outside_data_is_empty_not_error() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter
            .fetch_ohlcv("GOLDBEES.NS", &range("2030-01-01", "2030-02-01"))
            .unwrap();
        assert!(bars.is_empty());
    }

    #[test]
    fn missing_file_is_fetch_error() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let result = adapter.fetch_ohlcv("XYZ", &range("2024-01-01", "2024-01-31"));
        assert!(matches!(
            result,
            Err(TrendscopeError::Fetch { symbol, .. }) if symbol == "XYZ"
        ));
    }
}

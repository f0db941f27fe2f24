#![allow(dead_code)]

use chrono::{Days, NaiveDate};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;
use trendscope::domain::error::TrendscopeError;
pub use trendscope::domain::ohlcv::OhlcvBar;
use trendscope::domain::window::{BarInterval, DataWindow, FetchRequest, Period};
use trendscope::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        request: &FetchRequest,
    ) -> Result<Vec<OhlcvBar>, TrendscopeError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(TrendscopeError::Fetch {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        let bars = self.data.get(symbol).cloned().unwrap_or_default();
        Ok(request.window.select(bars))
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(symbol: &str, date: NaiveDate, close: f64) -> OhlcvBar {
    OhlcvBar {
        symbol: symbol.to_string(),
        date,
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 10_000,
    }
}

/// One bar per calendar day starting at `start`.
pub fn bars_from_closes(symbol: &str, start: NaiveDate, closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(symbol, start + Days::new(i as u64), close))
        .collect()
}

pub fn rising(n: usize, start: f64) -> Vec<f64> {
    (0..n).map(|i| start + i as f64).collect()
}

pub fn falling(n: usize, start: f64) -> Vec<f64> {
    (0..n).map(|i| start - i as f64).collect()
}

/// Alternating `+up` / `-down` moves: an uptrend with pullbacks.
pub fn zigzag(n: usize, up: f64, down: f64, start: f64) -> Vec<f64> {
    let mut closes = vec![start];
    for i in 1..n {
        let prev = closes[i - 1];
        closes.push(if i % 2 == 1 { prev + up } else { prev - down });
    }
    closes
}

/// 80 falling bars then 60 sharply rising ones. The buy signal turns on
/// at index 95 (close 169) and is still on at the last bar (close 301).
pub fn decline_then_rally() -> Vec<f64> {
    let mut closes = falling(80, 200.0);
    closes.extend((1..=60).map(|i| 121.0 + 3.0 * i as f64));
    closes
}

/// Same as [`decline_then_rally`] but the rally is cut to 40 bars and
/// followed by a 40 bar slide. One trade: index 95 (169) to index 127 (217).
pub fn rally_then_slide() -> Vec<f64> {
    let mut closes = falling(80, 200.0);
    closes.extend((1..=40).map(|i| 121.0 + 3.0 * i as f64));
    closes.extend((1..=40).map(|i| 241.0 - 3.0 * i as f64));
    closes
}

pub fn max_lookback() -> FetchRequest {
    FetchRequest {
        window: DataWindow::Lookback(Period::Max),
        interval: BarInterval::Daily,
    }
}

pub fn full_range() -> FetchRequest {
    FetchRequest {
        window: DataWindow::Range {
            start: date(2000, 1, 1),
            end: date(2100, 1, 1),
        },
        interval: BarInterval::Daily,
    }
}

/// Writes `<dir>/<symbol>.csv` in the loader's format.
pub fn write_csv(dir: &Path, symbol: &str, bars: &[OhlcvBar]) {
    let mut content = String::from("date,open,high,low,close,volume\n");
    for b in bars {
        writeln!(
            content,
            "{},{},{},{},{},{}",
            b.date, b.open, b.high, b.low, b.close, b.volume
        )
        .unwrap();
    }
    std::fs::write(dir.join(format!("{}.csv", symbol)), content).unwrap();
}

//! OHLCV bar representation.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl OhlcvBar {
    /// All price fields are finite numbers.
    pub fn is_complete(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Drop incomplete bars, order by date and keep the first bar seen for each date.
pub fn normalize_bars(mut bars: Vec<OhlcvBar>) -> Vec<OhlcvBar> {
    bars.retain(OhlcvBar::is_complete);
    bars.sort_by_key(|b| b.date);
    bars.dedup_by_key(|b| b.date);
    bars
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: &str, close: f64) -> OhlcvBar {
        OhlcvBar {
            symbol: "TCS.NS".into(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 10_000,
        }
    }

    #[test]
    fn incomplete_bar_detected() {
        let mut b = bar("2024-01-02", 100.0);
        assert!(b.is_complete());
        b.high = f64::NAN;
        assert!(!b.is_complete());
    }

    #[test]
    fn normalize_sorts_and_drops() {
        let bars = vec![
            bar("2024-01-03", 103.0),
            bar("2024-01-01", f64::NAN),
            bar("2024-01-02", 102.0),
        ];
        let out = normalize_bars(bars);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].close, 102.0);
        assert_eq!(out[1].close, 103.0);
    }

    #[test]
    fn normalize_dedups_dates() {
        let bars = vec![bar("2024-01-02", 1.0), bar("2024-01-02", 2.0)];
        let out = normalize_bars(bars);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].close, 1.0);
    }
}

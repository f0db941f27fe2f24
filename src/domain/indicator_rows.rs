//! Bars joined with RSI(14), EMA(20) and EMA(50).
//!
//! Rows are only produced where all three indicators are defined.

use crate::domain::error::TrendscopeError;
use crate::domain::indicator::ema::calculate_ema;
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::IndicatorType;
use crate::domain::ohlcv::OhlcvBar;

pub const RSI_PERIOD: usize = 14;
pub const EMA_FAST: usize = 20;
pub const EMA_SLOW: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub bar: OhlcvBar,
    pub rsi14: f64,
    pub ema20: f64,
    pub ema50: f64,
}

impl IndicatorRow {
    pub fn close(&self) -> f64 {
        self.bar.close
    }
}

/// Bars needed before the first row can be emitted.
pub fn min_bars_required() -> usize {
    let longest_warmup = [
        IndicatorType::Rsi(RSI_PERIOD),
        IndicatorType::Ema(EMA_FAST),
        IndicatorType::Ema(EMA_SLOW),
    ]
    .iter()
    .map(IndicatorType::warmup)
    .max()
    .unwrap_or(0);
    longest_warmup + 1
}

pub fn compute_indicator_rows(bars: &[OhlcvBar]) -> Vec<IndicatorRow> {
    let rsi = calculate_rsi(bars, RSI_PERIOD);
    let ema_fast = calculate_ema(bars, EMA_FAST);
    let ema_slow = calculate_ema(bars, EMA_SLOW);

    bars.iter()
        .enumerate()
        .filter_map(|(i, bar)| {
            Some(IndicatorRow {
                bar: bar.clone(),
                rsi14: rsi.value_at(i)?,
                ema20: ema_fast.value_at(i)?,
                ema50: ema_slow.value_at(i)?,
            })
        })
        .collect()
}

/// Like [`compute_indicator_rows`], but an empty result is an error naming the symbol.
pub fn require_indicator_rows(
    symbol: &str,
    bars: &[OhlcvBar],
) -> Result<Vec<IndicatorRow>, TrendscopeError> {
    if bars.is_empty() {
        return Err(TrendscopeError::NoData {
            symbol: symbol.to_string(),
        });
    }
    let rows = compute_indicator_rows(bars);
    if rows.is_empty() {
        return Err(TrendscopeError::InsufficientWarmup {
            symbol: symbol.to_string(),
            bars: bars.len(),
            minimum: min_bars_required(),
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn trending_bars(count: usize) -> Vec<OhlcvBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..count)
            .map(|i| {
                let close = 100.0 + i as f64 + if i % 3 == 0 { -2.0 } else { 0.0 };
                OhlcvBar {
                    symbol: "INFY.NS".into(),
                    date: start + chrono::Duration::days(i as i64),
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1000,
                }
            })
            .collect()
    }

    #[test]
    fn min_bars_is_slow_ema_window() {
        assert_eq!(min_bars_required(), 50);
    }

    #[test]
    fn warmup_rows_are_dropped() {
        let bars = trending_bars(60);
        let rows = compute_indicator_rows(&bars);
        assert_eq!(rows.len(), 60 - 49);
        assert_eq!(rows[0].bar.date, bars[49].date);
        assert_eq!(rows.last().unwrap().bar.date, bars[59].date);
    }

    #[test]
    fn no_rows_before_warmup() {
        assert!(compute_indicator_rows(&trending_bars(49)).is_empty());
        assert_eq!(compute_indicator_rows(&trending_bars(50)).len(), 1);
    }

    #[test]
    fn require_rows_reports_no_data() {
        let err = require_indicator_rows("SBIN.NS", &[]).unwrap_err();
        assert!(matches!(err, TrendscopeError::NoData { symbol } if symbol == "SBIN.NS"));
    }

    #[test]
    fn require_rows_reports_warmup() {
        let err = require_indicator_rows("SBIN.NS", &trending_bars(30)).unwrap_err();
        assert!(matches!(
            err,
            TrendscopeError::InsufficientWarmup { bars: 30, minimum: 50, .. }
        ));
    }

    #[test]
    fn recompute_is_bit_identical() {
        let bars = trending_bars(120);
        let a = compute_indicator_rows(&bars);
        let b = compute_indicator_rows(&bars);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.rsi14.to_bits(), y.rsi14.to_bits());
            assert_eq!(x.ema20.to_bits(), y.ema20.to_bits());
            assert_eq!(x.ema50.to_bits(), y.ema50.to_bits());
        }
    }
}

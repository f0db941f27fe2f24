//! Exponential Moving Average.
//!
//! k = 2/(n+1), seed with the SMA of the first n closes, then
//! EMA[i] = C[i]*k + EMA[i-1]*(1-k). The first (n-1) points are undefined.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_ema(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::Ema(period);
    if period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        };
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut sum = 0.0;
    let mut ema: Option<f64> = None;

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            ema = match ema {
                Some(prev) => Some(bar.close * k + prev * (1.0 - k)),
                None => {
                    sum += bar.close;
                    (i + 1 == period).then(|| sum / period as f64)
                }
            };
            IndicatorPoint {
                date: bar.date,
                value: ema,
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<OhlcvBar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                symbol: "TEST".into(),
                date: NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect()
    }

    #[test]
    fn ema_warmup() {
        let series = calculate_ema(&make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0]), 3);

        assert_eq!(series.values.len(), 5);
        assert!(series.value_at(0).is_none());
        assert!(series.value_at(1).is_none());
        assert!(series.value_at(2).is_some());
        assert!(series.value_at(4).is_some());
    }

    #[test]
    fn ema_period_1_tracks_close() {
        let series = calculate_ema(&make_bars(&[10.0, 20.0, 30.0]), 1);
        assert_eq!(series.value_at(0), Some(10.0));
        assert_eq!(series.value_at(1), Some(20.0));
        assert_eq!(series.value_at(2), Some(30.0));
    }

    #[test]
    fn ema_recursive_calculation() {
        let series = calculate_ema(&make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0]), 3);

        let k = 2.0 / 4.0;
        let sma = 20.0;
        let ema_3 = 40.0 * k + sma * (1.0 - k);
        let ema_4 = 50.0 * k + ema_3 * (1.0 - k);

        assert_relative_eq!(series.value_at(2).unwrap(), sma);
        assert_relative_eq!(series.value_at(3).unwrap(), ema_3);
        assert_relative_eq!(series.value_at(4).unwrap(), ema_4);
    }

    #[test]
    fn ema_flat_prices() {
        let series = calculate_ema(&make_bars(&[100.0; 6]), 3);
        for i in 2..6 {
            assert_relative_eq!(series.value_at(i).unwrap(), 100.0);
        }
    }

    #[test]
    fn ema_shorter_than_period() {
        let series = calculate_ema(&make_bars(&[10.0, 20.0]), 5);
        assert_eq!(series.values.len(), 2);
        assert!(series.values.iter().all(|p| p.value.is_none()));
    }

    #[test]
    fn ema_empty_and_zero_period() {
        assert!(calculate_ema(&[], 3).values.is_empty());
        assert!(calculate_ema(&make_bars(&[1.0, 2.0]), 0).values.is_empty());
    }
}

//! RSI (Relative Strength Index) with Wilder's smoothing.
//!
//! - First average: simple mean of the first n gains/losses
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss), and 100 when avg_loss == 0.
//! The first n points are undefined (n price changes are needed).

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_rsi(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::Rsi(period);
    let mut values: Vec<IndicatorPoint> = bars
        .iter()
        .map(|b| IndicatorPoint {
            date: b.date,
            value: None,
        })
        .collect();

    if period == 0 || bars.len() <= period {
        return IndicatorSeries {
            indicator_type,
            values,
        };
    }

    let n = period as f64;
    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;
    let mut averages: Option<(f64, f64)> = None;

    for (i, pair) in bars.windows(2).enumerate() {
        let change = pair[1].close - pair[0].close;
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        averages = match averages {
            Some((avg_gain, avg_loss)) => Some((
                (avg_gain * (n - 1.0) + gain) / n,
                (avg_loss * (n - 1.0) + loss) / n,
            )),
            None => {
                gain_sum += gain;
                loss_sum += loss;
                (i + 1 == period).then(|| (gain_sum / n, loss_sum / n))
            }
        };

        if let Some((avg_gain, avg_loss)) = averages {
            values[i + 1].value = Some(rsi_from_averages(avg_gain, avg_loss));
        }
    }

    IndicatorSeries {
        indicator_type,
        values,
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}

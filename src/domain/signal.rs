//! Backtest buy signal and its entry/exit transitions.

use crate::domain::indicator_rows::IndicatorRow;

/// RSI level the backtest requires for momentum confirmation.
pub const BACKTEST_RSI_THRESHOLD: f64 = 55.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SignalRow {
    pub row: IndicatorRow,
    pub buy_signal: bool,
    pub entry_flag: bool,
    pub exit_flag: bool,
}

/// Uptrend (EMA20 above EMA50) confirmed by RSI above `threshold`.
pub fn buy_signal(row: &IndicatorRow, threshold: f64) -> bool {
    row.ema20 > row.ema50 && row.rsi14 > threshold
}

/// Evaluate the buy signal on every row and flag its transitions.
///
/// The first row has no prior state and never carries a flag.
pub fn evaluate_signals(rows: &[IndicatorRow]) -> Vec<SignalRow> {
    let mut prev: Option<bool> = None;
    rows.iter()
        .map(|row| {
            let signal = buy_signal(row, BACKTEST_RSI_THRESHOLD);
            let entry_flag = prev == Some(false) && signal;
            let exit_flag = prev == Some(true) && !signal;
            prev = Some(signal);
            SignalRow {
                row: row.clone(),
                buy_signal: signal,
                entry_flag,
                exit_flag,
            }
        })
        .collect()
}

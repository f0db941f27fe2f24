//! Latest-bar trend + momentum screen.

use std::cmp::Ordering;

use crate::domain::indicator_rows::IndicatorRow;

/// Open RSI band a passing symbol must sit in.
pub const SCREEN_RSI_LOWER: f64 = 50.0;
pub const SCREEN_RSI_UPPER: f64 = 70.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenResult {
    pub symbol: String,
    pub close: f64,
    pub ema20: f64,
    pub ema50: f64,
    pub rsi14: f64,
    pub uptrend: bool,
    pub price_above_ema20: bool,
    pub rsi_in_band: bool,
    pub passes_screen: bool,
}

pub fn screen_row(symbol: &str, row: &IndicatorRow) -> ScreenResult {
    let uptrend = row.ema20 > row.ema50;
    let price_above_ema20 = row.close() > row.ema20;
    let rsi_in_band = row.rsi14 > SCREEN_RSI_LOWER && row.rsi14 < SCREEN_RSI_UPPER;

    ScreenResult {
        symbol: symbol.to_string(),
        close: row.close(),
        ema20: row.ema20,
        ema50: row.ema50,
        rsi14: row.rsi14,
        uptrend,
        price_above_ema20,
        rsi_in_band,
        passes_screen: uptrend && price_above_ema20 && rsi_in_band,
    }
}

/// Screen the most recent row, `None` when there are no rows.
pub fn screen_latest(symbol: &str, rows: &[IndicatorRow]) -> Option<ScreenResult> {
    rows.last().map(|row| screen_row(symbol, row))
}

/// Passing results ordered by ascending RSI.
pub fn passing_candidates(results: &[ScreenResult]) -> Vec<ScreenResult> {
    let mut candidates: Vec<ScreenResult> = results
        .iter()
        .filter(|r| r.passes_screen)
        .cloned()
        .collect();
    candidates.sort_by(|a, b| a.rsi14.partial_cmp(&b.rsi14).unwrap_or(Ordering::Equal));
    candidates
}

//! Technical indicator implementations.
//!
//! - `IndicatorPoint`: one dated value, `None` while the indicator warms up
//! - `IndicatorType`: indicator identity + parameters
//! - `IndicatorSeries`: a series aligned one-to-one with its input bars

pub mod ema;
pub mod rsi;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Ema(usize),
    Rsi(usize),
}

impl IndicatorType {
    /// Number of leading bars that never carry a value.
    pub fn warmup(&self) -> usize {
        match *self {
            IndicatorType::Ema(period) => period.saturating_sub(1),
            IndicatorType::Rsi(period) => period,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values.get(index).and_then(|p| p.value)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
        }
    }
}

//! Fetch windows: explicit date ranges or lookback periods like `200d` / `1y`.

use chrono::{Days, Months, NaiveDate};
use std::fmt;
use std::str::FromStr;

use crate::domain::ohlcv::OhlcvBar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Days(u32),
    Weeks(u32),
    Months(u32),
    Years(u32),
    Max,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid period '{0}', expected e.g. 200d, 4wk, 6mo, 1y or max")]
pub struct PeriodParseError(pub String);

impl FromStr for Period {
    type Err = PeriodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if s == "max" {
            return Ok(Period::Max);
        }
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| PeriodParseError(s.clone()))?;
        let (digits, unit) = s.split_at(split);
        let n: u32 = digits.parse().map_err(|_| PeriodParseError(s.clone()))?;
        if n == 0 {
            return Err(PeriodParseError(s));
        }
        match unit {
            "d" => Ok(Period::Days(n)),
            "wk" => Ok(Period::Weeks(n)),
            "mo" => Ok(Period::Months(n)),
            "y" => Ok(Period::Years(n)),
            _ => Err(PeriodParseError(s.clone())),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Days(n) => write!(f, "{}d", n),
            Period::Weeks(n) => write!(f, "{}wk", n),
            Period::Months(n) => write!(f, "{}mo", n),
            Period::Years(n) => write!(f, "{}y", n),
            Period::Max => write!(f, "max"),
        }
    }
}

impl Period {
    /// Earliest date (exclusive) covered when looking back from `anchor`.
    /// `None` means unbounded.
    pub fn cutoff(&self, anchor: NaiveDate) -> Option<NaiveDate> {
        match *self {
            Period::Days(n) => anchor.checked_sub_days(Days::new(n as u64)),
            Period::Weeks(n) => anchor.checked_sub_days(Days::new(n as u64 * 7)),
            Period::Months(n) => anchor.checked_sub_months(Months::new(n)),
            Period::Years(n) => anchor.checked_sub_months(Months::new(n.saturating_mul(12))),
            Period::Max => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarInterval {
    Daily,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported bar interval '{0}', only 1d is available")]
pub struct IntervalParseError(pub String);

impl FromStr for BarInterval {
    type Err = IntervalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1d" | "daily" => Ok(BarInterval::Daily),
            other => Err(IntervalParseError(other.to_string())),
        }
    }
}

impl fmt::Display for BarInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BarInterval::Daily => write!(f, "1d"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataWindow {
    /// `start` inclusive, `end` exclusive.
    Range { start: NaiveDate, end: NaiveDate },
    /// Anchored at the latest available bar.
    Lookback(Period),
}

impl DataWindow {
    /// Keep the bars inside the window. Input must be date ordered.
    pub fn select(&self, bars: Vec<OhlcvBar>) -> Vec<OhlcvBar> {
        match *self {
            DataWindow::Range { start, end } => bars
                .into_iter()
                .filter(|b| b.date >= start && b.date < end)
                .collect(),
            DataWindow::Lookback(period) => {
                let cutoff = bars.last().and_then(|b| period.cutoff(b.date));
                match cutoff {
                    Some(cutoff) => bars.into_iter().filter(|b| b.date > cutoff).collect(),
                    None => bars,
                }
            }
        }
    }
}

impl fmt::Display for DataWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataWindow::Range { start, end } => write!(f, "{} to {}", start, end),
            DataWindow::Lookback(period) => write!(f, "last {}", period),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    pub window: DataWindow,
    pub interval: BarInterval,
}

//! Flat / in-trade state machine turning entry and exit flags into trades.
//!
//! Entry flags seen while in a trade are ignored, so at most one trade is
//! open at a time. A trade still open when the signals run out is closed at
//! the last bar's close and marked as a forced exit.

use chrono::NaiveDate;

use crate::domain::signal::SignalRow;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackerState {
    Flat,
    InTrade {
        entry_date: NaiveDate,
        entry_price: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    pub return_pct: f64,
    pub forced_exit: bool,
}

impl Trade {
    fn close(
        entry_date: NaiveDate,
        entry_price: f64,
        exit_date: NaiveDate,
        exit_price: f64,
        forced_exit: bool,
    ) -> Self {
        Trade {
            entry_date,
            entry_price,
            exit_date,
            exit_price,
            return_pct: (exit_price - entry_price) / entry_price * 100.0,
            forced_exit,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TradeTracker {
    state: TrackerState,
    last_bar: Option<(NaiveDate, f64)>,
    trades: Vec<Trade>,
}

impl Default for TradeTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl TradeTracker {
    pub fn new() -> Self {
        TradeTracker {
            state: TrackerState::Flat,
            last_bar: None,
            trades: Vec::new(),
        }
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    /// Advance by one bar.
    pub fn step(&mut self, signal: &SignalRow) {
        let date = signal.row.bar.date;
        let close = signal.row.bar.close;
        self.last_bar = Some((date, close));

        match self.state {
            TrackerState::Flat if signal.entry_flag => {
                self.state = TrackerState::InTrade {
                    entry_date: date,
                    entry_price: close,
                };
            }
            TrackerState::InTrade {
                entry_date,
                entry_price,
            } if signal.exit_flag => {
                self.trades
                    .push(Trade::close(entry_date, entry_price, date, close, false));
                self.state = TrackerState::Flat;
            }
            _ => {}
        }
    }

    /// Close any open trade at the last bar seen and return all trades.
    pub fn finish(mut self) -> Vec<Trade> {
        if let (
            TrackerState::InTrade {
                entry_date,
                entry_price,
            },
            Some((date, close)),
        ) = (self.state, self.last_bar)
        {
            self.trades
                .push(Trade::close(entry_date, entry_price, date, close, true));
            self.state = TrackerState::Flat;
        }
        self.trades
    }
}

pub fn track_trades(signals: &[SignalRow]) -> Vec<Trade> {
    let mut tracker = TradeTracker::new();
    for signal in signals {
        tracker.step(signal);
    }
    tracker.finish()
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeSummary {
    pub count: usize,
    pub mean_return_pct: f64,
    pub total_return_pct: f64,
}

/// `None` when no trades were taken.
pub fn summarize_trades(trades: &[Trade]) -> Option<TradeSummary> {
    if trades.is_empty() {
        return None;
    }
    let total: f64 = trades.iter().map(|t| t.return_pct).sum();
    Some(TradeSummary {
        count: trades.len(),
        mean_return_pct: total / trades.len() as f64,
        total_return_pct: total,
    })
}

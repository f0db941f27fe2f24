//! Finished pipeline results handed to report writers.

use crate::domain::metrics::PortfolioSummaryRow;
use crate::domain::price_table::{CorrelationMatrix, DateTable};
use crate::domain::screener::ScreenResult;
use crate::domain::signal::SignalRow;
use crate::domain::trade_tracker::{Trade, TradeSummary};
use crate::domain::universe::SkippedSymbol;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestReport {
    pub symbol: String,
    pub signals: Vec<SignalRow>,
    pub trades: Vec<Trade>,
    /// `None` when no trades were taken.
    pub summary: Option<TradeSummary>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenReport {
    /// One row per screened symbol, in input order.
    pub results: Vec<ScreenResult>,
    /// Passing rows ordered by ascending RSI.
    pub candidates: Vec<ScreenResult>,
    pub skipped: Vec<SkippedSymbol>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioReport {
    pub summary: Vec<PortfolioSummaryRow>,
    pub prices: DateTable,
    pub returns: DateTable,
    pub equity: DateTable,
    pub correlation: CorrelationMatrix,
    pub skipped: Vec<SkippedSymbol>,
}
